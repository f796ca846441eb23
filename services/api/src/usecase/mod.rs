pub mod access;
pub mod audit;
pub mod card;
pub mod device;
pub mod metering;
pub mod reservation;
pub mod session;
pub mod unlock;
