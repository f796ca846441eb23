pub mod access;
pub mod auth;
pub mod card;
pub mod device;
pub mod lab;
pub mod metering;
pub mod reservation;
pub mod role;
pub mod user;
