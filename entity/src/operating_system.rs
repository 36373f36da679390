use sea_orm::entity::prelude::*;

/// An operating system release. Empty strings stand for unset fields;
/// major/minor versions stay strings so leading zeros survive as persisted.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "operating_systems")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub release_id: String,
    pub major_version: String,
    pub minor_version: String,
    pub label_version: String,
    pub codename: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::affected_package_handle::Entity")]
    AffectedPackageHandle,
}

impl Related<super::affected_package_handle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AffectedPackageHandle.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
