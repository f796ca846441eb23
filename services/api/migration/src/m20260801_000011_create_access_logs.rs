use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AccessLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AccessLogs::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AccessLogs::UserId).uuid().not_null())
                    .col(ColumnDef::new(AccessLogs::DeviceId).uuid().not_null())
                    .col(ColumnDef::new(AccessLogs::Permission).boolean().not_null())
                    .col(
                        ColumnDef::new(AccessLogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AccessLogs::Table, AccessLogs::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AccessLogs::Table, AccessLogs::DeviceId)
                            .to(Devices::Table, Devices::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Dashboard lists logs per device, newest first.
        manager
            .create_index(
                Index::create()
                    .table(AccessLogs::Table)
                    .col(AccessLogs::DeviceId)
                    .col(AccessLogs::CreatedAt)
                    .name("idx_access_logs_device_created")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_access_logs_device_created")
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(AccessLogs::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum AccessLogs {
    Table,
    Id,
    UserId,
    DeviceId,
    Permission,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}

#[derive(Iden)]
enum Devices {
    Table,
    Id,
}
