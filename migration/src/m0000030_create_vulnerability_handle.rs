use sea_orm_migration::prelude::*;

use crate::m0000010_create_blob::Blobs;
use crate::m0000020_create_provider::Providers;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VulnerabilityHandles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VulnerabilityHandles::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(VulnerabilityHandles::Name).string().not_null())
                    .col(ColumnDef::new(VulnerabilityHandles::Status).string().not_null())
                    .col(ColumnDef::new(VulnerabilityHandles::PublishedDate).timestamp_with_time_zone())
                    .col(ColumnDef::new(VulnerabilityHandles::ModifiedDate).timestamp_with_time_zone())
                    .col(ColumnDef::new(VulnerabilityHandles::ProviderId).string().not_null())
                    .col(ColumnDef::new(VulnerabilityHandles::BlobId).big_integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vulnerability_handle_provider")
                            .from(VulnerabilityHandles::Table, VulnerabilityHandles::ProviderId)
                            .to(Providers::Table, Providers::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vulnerability_handle_blob")
                            .from(VulnerabilityHandles::Table, VulnerabilityHandles::BlobId)
                            .to(Blobs::Table, Blobs::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_vulnerability_handle_name_provider")
                    .table(VulnerabilityHandles::Table)
                    .col(VulnerabilityHandles::Name)
                    .col(VulnerabilityHandles::ProviderId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VulnerabilityHandles::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum VulnerabilityHandles {
    Table,
    Id,
    // --
    Name,
    Status,
    PublishedDate,
    ModifiedDate,
    ProviderId,
    BlobId,
}
