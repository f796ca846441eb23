pub mod db;
pub mod device_client;
