use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserLabs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserLabs::UserId).uuid().not_null())
                    .col(ColumnDef::new(UserLabs::LabId).uuid().not_null())
                    .col(
                        ColumnDef::new(UserLabs::IsStaff)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .primary_key(Index::create().col(UserLabs::UserId).col(UserLabs::LabId))
                    .foreign_key(
                        ForeignKey::create()
                            .from(UserLabs::Table, UserLabs::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(UserLabs::Table, UserLabs::LabId)
                            .to(Labs::Table, Labs::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserLabs::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum UserLabs {
    Table,
    UserId,
    LabId,
    IsStaff,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}

#[derive(Iden)]
enum Labs {
    Table,
    Id,
}
