use sea_orm_migration::prelude::*;

use crate::m0000010_create_blob::Blobs;
use crate::m0000030_create_vulnerability_handle::VulnerabilityHandles;
use crate::m0000040_create_package::Packages;
use crate::m0000070_create_operating_system::OperatingSystems;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AffectedPackageHandles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AffectedPackageHandles::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AffectedPackageHandles::PackageId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AffectedPackageHandles::OperatingSystemId).big_integer())
                    .col(
                        ColumnDef::new(AffectedPackageHandles::VulnerabilityId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AffectedPackageHandles::BlobId)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_affected_package_handle_package")
                            .from(AffectedPackageHandles::Table, AffectedPackageHandles::PackageId)
                            .to(Packages::Table, Packages::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_affected_package_handle_operating_system")
                            .from(
                                AffectedPackageHandles::Table,
                                AffectedPackageHandles::OperatingSystemId,
                            )
                            .to(OperatingSystems::Table, OperatingSystems::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_affected_package_handle_vulnerability")
                            .from(
                                AffectedPackageHandles::Table,
                                AffectedPackageHandles::VulnerabilityId,
                            )
                            .to(VulnerabilityHandles::Table, VulnerabilityHandles::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_affected_package_handle_blob")
                            .from(AffectedPackageHandles::Table, AffectedPackageHandles::BlobId)
                            .to(Blobs::Table, Blobs::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_affected_package_handle_package")
                    .table(AffectedPackageHandles::Table)
                    .col(AffectedPackageHandles::PackageId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_affected_package_handle_vulnerability")
                    .table(AffectedPackageHandles::Table)
                    .col(AffectedPackageHandles::VulnerabilityId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AffectedPackageHandles::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum AffectedPackageHandles {
    Table,
    Id,
    // --
    PackageId,
    OperatingSystemId,
    VulnerabilityId,
    BlobId,
}
