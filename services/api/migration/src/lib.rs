use sea_orm_migration::prelude::*;

mod m20260801_000001_create_users;
mod m20260801_000002_create_roles;
mod m20260801_000003_create_user_roles;
mod m20260801_000004_create_labs;
mod m20260801_000005_create_user_labs;
mod m20260801_000006_create_devices;
mod m20260801_000007_create_device_roles;
mod m20260801_000008_create_cards;
mod m20260801_000009_create_user_cards;
mod m20260801_000010_create_reservations;
mod m20260801_000011_create_access_logs;
mod m20260801_000012_create_meter_readings;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260801_000001_create_users::Migration),
            Box::new(m20260801_000002_create_roles::Migration),
            Box::new(m20260801_000003_create_user_roles::Migration),
            Box::new(m20260801_000004_create_labs::Migration),
            Box::new(m20260801_000005_create_user_labs::Migration),
            Box::new(m20260801_000006_create_devices::Migration),
            Box::new(m20260801_000007_create_device_roles::Migration),
            Box::new(m20260801_000008_create_cards::Migration),
            Box::new(m20260801_000009_create_user_cards::Migration),
            Box::new(m20260801_000010_create_reservations::Migration),
            Box::new(m20260801_000011_create_access_logs::Migration),
            Box::new(m20260801_000012_create_meter_readings::Migration),
        ]
    }
}
