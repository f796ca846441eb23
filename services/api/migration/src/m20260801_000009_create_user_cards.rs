use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserCards::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserCards::UserId).uuid().not_null())
                    .col(ColumnDef::new(UserCards::CardId).uuid().not_null())
                    .primary_key(
                        Index::create()
                            .col(UserCards::UserId)
                            .col(UserCards::CardId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(UserCards::Table, UserCards::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(UserCards::Table, UserCards::CardId)
                            .to(Cards::Table, Cards::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserCards::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum UserCards {
    Table,
    UserId,
    CardId,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}

#[derive(Iden)]
enum Cards {
    Table,
    Id,
}
