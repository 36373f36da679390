use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Cpes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Cpes::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Cpes::Part).string().not_null())
                    .col(ColumnDef::new(Cpes::Vendor).string().not_null())
                    .col(ColumnDef::new(Cpes::Product).string().not_null())
                    .col(ColumnDef::new(Cpes::Edition).string().not_null())
                    .col(ColumnDef::new(Cpes::Language).string().not_null())
                    .col(ColumnDef::new(Cpes::SoftwareEdition).string().not_null())
                    .col(ColumnDef::new(Cpes::TargetHardware).string().not_null())
                    .col(ColumnDef::new(Cpes::TargetSoftware).string().not_null())
                    .col(ColumnDef::new(Cpes::Other).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_cpe_attributes")
                    .table(Cpes::Table)
                    .col(Cpes::Part)
                    .col(Cpes::Vendor)
                    .col(Cpes::Product)
                    .col(Cpes::Edition)
                    .col(Cpes::Language)
                    .col(Cpes::SoftwareEdition)
                    .col(Cpes::TargetHardware)
                    .col(Cpes::TargetSoftware)
                    .col(Cpes::Other)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Cpes::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Cpes {
    Table,
    Id,
    // --
    Part,
    Vendor,
    Product,
    Edition,
    Language,
    SoftwareEdition,
    TargetHardware,
    TargetSoftware,
    Other,
}
