use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Labs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Labs::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Labs::Name).string().not_null().unique_key())
                    .col(ColumnDef::new(Labs::Description).string().null())
                    .col(
                        ColumnDef::new(Labs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Labs::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Labs {
    Table,
    Id,
    Name,
    Description,
    CreatedAt,
}
