use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Providers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Providers::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Providers::Version).string())
                    .col(ColumnDef::new(Providers::Processor).string())
                    .col(ColumnDef::new(Providers::DateCaptured).timestamp_with_time_zone())
                    .col(ColumnDef::new(Providers::InputDigest).string())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Providers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Providers {
    Table,
    Id,
    // --
    Version,
    Processor,
    DateCaptured,
    InputDigest,
}
