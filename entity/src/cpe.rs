use sea_orm::{entity::prelude::*, Set};
use vulndb_common::cpe::CpeAttributes;

/// A CPE attribute tuple, unique across all nine attributes and shared by any
/// number of packages through the link table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "cpes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub part: String,
    pub vendor: String,
    pub product: String,
    pub edition: String,
    pub language: String,
    pub software_edition: String,
    pub target_hardware: String,
    pub target_software: String,
    pub other: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::package_cpe::Entity")]
    PackageCpe,
}

impl Related<super::package_cpe::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PackageCpe.def()
    }
}

impl Related<super::package::Entity> for Entity {
    fn to() -> RelationDef {
        super::package_cpe::Relation::Package.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::package_cpe::Relation::Cpe.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Model> for CpeAttributes {
    fn from(model: &Model) -> Self {
        Self {
            part: model.part.clone(),
            vendor: model.vendor.clone(),
            product: model.product.clone(),
            edition: model.edition.clone(),
            language: model.language.clone(),
            software_edition: model.software_edition.clone(),
            target_hardware: model.target_hardware.clone(),
            target_software: model.target_software.clone(),
            other: model.other.clone(),
        }
    }
}

impl From<&CpeAttributes> for ActiveModel {
    fn from(attributes: &CpeAttributes) -> Self {
        Self {
            id: Default::default(),
            part: Set(attributes.part.clone()),
            vendor: Set(attributes.vendor.clone()),
            product: Set(attributes.product.clone()),
            edition: Set(attributes.edition.clone()),
            language: Set(attributes.language.clone()),
            software_edition: Set(attributes.software_edition.clone()),
            target_hardware: Set(attributes.target_hardware.clone()),
            target_software: Set(attributes.target_software.clone()),
            other: Set(attributes.other.clone()),
        }
    }
}
