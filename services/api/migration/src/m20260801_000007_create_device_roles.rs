use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DeviceRoles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(DeviceRoles::DeviceId).uuid().not_null())
                    .col(ColumnDef::new(DeviceRoles::RoleId).uuid().not_null())
                    .primary_key(
                        Index::create()
                            .col(DeviceRoles::DeviceId)
                            .col(DeviceRoles::RoleId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(DeviceRoles::Table, DeviceRoles::DeviceId)
                            .to(Devices::Table, Devices::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(DeviceRoles::Table, DeviceRoles::RoleId)
                            .to(Roles::Table, Roles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DeviceRoles::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum DeviceRoles {
    Table,
    DeviceId,
    RoleId,
}

#[derive(Iden)]
enum Devices {
    Table,
    Id,
}

#[derive(Iden)]
enum Roles {
    Table,
    Id,
}
