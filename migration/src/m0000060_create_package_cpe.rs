use sea_orm_migration::prelude::*;

use crate::m0000040_create_package::Packages;
use crate::m0000050_create_cpe::Cpes;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PackageCpes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PackageCpes::PackageId).big_integer().not_null())
                    .col(ColumnDef::new(PackageCpes::CpeId).big_integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(PackageCpes::PackageId)
                            .col(PackageCpes::CpeId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_package_cpe_package")
                            .from(PackageCpes::Table, PackageCpes::PackageId)
                            .to(Packages::Table, Packages::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_package_cpe_cpe")
                            .from(PackageCpes::Table, PackageCpes::CpeId)
                            .to(Cpes::Table, Cpes::Id),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PackageCpes::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum PackageCpes {
    Table,
    PackageId,
    CpeId,
}
