use sea_orm::entity::prelude::*;

/// The fact row: a vulnerability affects a package, optionally scoped to an
/// operating system, with the details held in a blob.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "affected_package_handles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub package_id: i64,
    pub operating_system_id: Option<i64>,
    pub vulnerability_id: i64,
    pub blob_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::package::Entity",
        from = "Column::PackageId",
        to = "super::package::Column::Id"
    )]
    Package,
    #[sea_orm(
        belongs_to = "super::operating_system::Entity",
        from = "Column::OperatingSystemId",
        to = "super::operating_system::Column::Id"
    )]
    OperatingSystem,
    #[sea_orm(
        belongs_to = "super::vulnerability_handle::Entity",
        from = "Column::VulnerabilityId",
        to = "super::vulnerability_handle::Column::Id"
    )]
    Vulnerability,
    #[sea_orm(
        belongs_to = "super::blob::Entity",
        from = "Column::BlobId",
        to = "super::blob::Column::Id"
    )]
    Blob,
}

impl Related<super::package::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Package.def()
    }
}

impl Related<super::operating_system::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OperatingSystem.def()
    }
}

impl Related<super::vulnerability_handle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vulnerability.def()
    }
}

impl Related<super::blob::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Blob.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
