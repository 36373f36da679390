use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OperatingSystems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OperatingSystems::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OperatingSystems::Name).string().not_null())
                    .col(ColumnDef::new(OperatingSystems::ReleaseId).string().not_null())
                    .col(ColumnDef::new(OperatingSystems::MajorVersion).string().not_null())
                    .col(ColumnDef::new(OperatingSystems::MinorVersion).string().not_null())
                    .col(ColumnDef::new(OperatingSystems::LabelVersion).string().not_null())
                    .col(ColumnDef::new(OperatingSystems::Codename).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_operating_system_identity")
                    .table(OperatingSystems::Table)
                    .col(OperatingSystems::Name)
                    .col(OperatingSystems::ReleaseId)
                    .col(OperatingSystems::MajorVersion)
                    .col(OperatingSystems::MinorVersion)
                    .col(OperatingSystems::LabelVersion)
                    .col(OperatingSystems::Codename)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OperatingSystems::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum OperatingSystems {
    Table,
    Id,
    // --
    Name,
    ReleaseId,
    MajorVersion,
    MinorVersion,
    LabelVersion,
    Codename,
}
