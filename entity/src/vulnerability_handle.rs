use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "vulnerability_handles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub status: String,
    pub published_date: Option<OffsetDateTime>,
    pub modified_date: Option<OffsetDateTime>,
    pub provider_id: String,
    pub blob_id: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::provider::Entity",
        from = "Column::ProviderId",
        to = "super::provider::Column::Id"
    )]
    Provider,
    #[sea_orm(
        belongs_to = "super::blob::Entity",
        from = "Column::BlobId",
        to = "super::blob::Column::Id"
    )]
    Blob,
    #[sea_orm(has_many = "super::affected_package_handle::Entity")]
    AffectedPackageHandle,
}

impl Related<super::provider::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Provider.def()
    }
}

impl Related<super::blob::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Blob.def()
    }
}

impl Related<super::affected_package_handle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AffectedPackageHandle.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// The lifecycle status of a vulnerability record, stored as its string form.
#[derive(
    Copy,
    Clone,
    Eq,
    Hash,
    Debug,
    Default,
    PartialEq,
    strum::EnumString,
    strum::Display,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
pub enum VulnerabilityStatus {
    Active,
    Rejected,
    Disputed,
    #[default]
    Unknown,
}
