use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A person. `password_hash` is the bcrypt digest; handlers must never
/// serialize it.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
    pub access_pin: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user together with their resolved role names.
#[derive(Debug, Clone)]
pub struct UserWithRoles {
    pub user: User,
    pub role_names: Vec<String>,
}

/// An RFID card.
#[derive(Debug, Clone)]
pub struct Card {
    pub id: Uuid,
    pub card_id: String,
    pub permission: bool,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A physical controller.
#[derive(Debug, Clone)]
pub struct Device {
    pub id: Uuid,
    pub mac_address: String,
    pub api_token: String,
    pub ip_address: Option<String>,
    pub is_authorized: bool,
    pub kind: Option<String>,
    pub lab_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// A device together with its assigned role names.
#[derive(Debug, Clone)]
pub struct DeviceWithRoles {
    pub device: Device,
    pub role_names: Vec<String>,
}

/// A laboratory.
#[derive(Debug, Clone)]
pub struct Lab {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Standing membership of a user in a lab.
#[derive(Debug, Clone, Copy)]
pub struct LabMember {
    pub user_id: Uuid,
    pub lab_id: Uuid,
    pub is_staff: bool,
}

/// A named permission bucket.
#[derive(Debug, Clone)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
}

/// A temporary access grant.
#[derive(Debug, Clone)]
pub struct Reservation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub lab_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    /// Inclusive on both ends: a scan at exactly `start_time` or `end_time`
    /// counts as inside the window.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start_time <= at && at <= self.end_time
    }
}

/// One appended authorization record.
#[derive(Debug, Clone)]
pub struct AccessLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub device_id: Uuid,
    pub permission: bool,
    pub created_at: DateTime<Utc>,
}

/// Access log joined with the username, for dashboard listings.
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    pub log: AccessLog,
    pub username: String,
}

/// One immutable meter sample.
#[derive(Debug, Clone)]
pub struct MeterReading {
    pub id: Uuid,
    pub device_id: Uuid,
    pub kind: i16,
    pub value: f64,
    pub total: f64,
    pub collected_at: DateTime<Utc>,
}

/// Validate a door PIN: 4–6 ASCII digits.
pub fn validate_pin(pin: &str) -> bool {
    (4..=6).contains(&pin.len()) && pin.chars().all(|c| c.is_ascii_digit())
}
