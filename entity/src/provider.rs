use sea_orm::entity::prelude::*;
use time::OffsetDateTime;

/// An upstream source of vulnerability records (a distribution, a registry, …).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "providers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub version: Option<String>,
    pub processor: Option<String>,
    pub date_captured: Option<OffsetDateTime>,
    pub input_digest: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::vulnerability_handle::Entity")]
    VulnerabilityHandle,
}

impl Related<super::vulnerability_handle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VulnerabilityHandle.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
