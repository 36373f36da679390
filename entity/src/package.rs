use sea_orm::entity::prelude::*;

/// A package identified by `(name, ecosystem)`, both stored lowercased with
/// the ecosystem alias-normalized.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "packages")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub ecosystem: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::package_cpe::Entity")]
    PackageCpe,
    #[sea_orm(has_many = "super::affected_package_handle::Entity")]
    AffectedPackageHandle,
}

impl Related<super::package_cpe::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PackageCpe.def()
    }
}

impl Related<super::cpe::Entity> for Entity {
    fn to() -> RelationDef {
        super::package_cpe::Relation::Cpe.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::package_cpe::Relation::Package.def().rev())
    }
}

impl Related<super::affected_package_handle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AffectedPackageHandle.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
