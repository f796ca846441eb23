//! sea-orm entities for the MOREA database.

pub mod access_logs;
pub mod cards;
pub mod device_roles;
pub mod devices;
pub mod labs;
pub mod meter_readings;
pub mod reservations;
pub mod roles;
pub mod user_cards;
pub mod user_labs;
pub mod user_roles;
pub mod users;
