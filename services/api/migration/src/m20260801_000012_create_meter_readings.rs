use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MeterReadings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MeterReadings::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MeterReadings::DeviceId).uuid().not_null())
                    .col(ColumnDef::new(MeterReadings::Kind).small_integer().not_null())
                    .col(ColumnDef::new(MeterReadings::Value).double().not_null())
                    .col(ColumnDef::new(MeterReadings::Total).double().not_null())
                    .col(
                        ColumnDef::new(MeterReadings::CollectedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(MeterReadings::Table, MeterReadings::DeviceId)
                            .to(Devices::Table, Devices::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Accumulator lookup: latest reading per (device, kind).
        manager
            .create_index(
                Index::create()
                    .table(MeterReadings::Table)
                    .col(MeterReadings::DeviceId)
                    .col(MeterReadings::Kind)
                    .name("idx_meter_readings_device_kind")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_meter_readings_device_kind")
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(MeterReadings::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum MeterReadings {
    Table,
    Id,
    DeviceId,
    Kind,
    Value,
    Total,
    CollectedAt,
}

#[derive(Iden)]
enum Devices {
    Table,
    Id,
}
