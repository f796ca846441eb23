#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use morea_domain::pagination::PageRequest;

use crate::domain::types::{
    AccessLog, AccessLogEntry, Card, Device, DeviceWithRoles, Lab, LabMember, MeterReading,
    Reservation, Role, User, UserWithRoles,
};
use crate::error::ApiError;

/// Fields an admin may change on a user. `None` leaves the column untouched.
#[derive(Debug, Default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub is_active: Option<bool>,
    pub access_pin: Option<Option<String>>,
}

/// Fields an admin may change on a device.
#[derive(Debug, Default)]
pub struct DevicePatch {
    pub is_authorized: Option<bool>,
    pub kind: Option<Option<String>>,
    pub lab_id: Option<Option<Uuid>>,
}

/// Repository for user profiles and their role assignments.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError>;
    /// Lookup by unique door PIN, with roles resolved for the decision path.
    async fn find_by_pin(&self, pin: &str) -> Result<Option<UserWithRoles>, ApiError>;
    async fn role_names(&self, user_id: Uuid) -> Result<Vec<String>, ApiError>;
    async fn list(&self) -> Result<Vec<User>, ApiError>;
    async fn create(&self, user: &User) -> Result<(), ApiError>;
    async fn update(&self, id: Uuid, patch: UserPatch) -> Result<(), ApiError>;
    /// Returns `true` if a row was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, ApiError>;
}

/// Repository for RFID cards and the User↔Card link.
pub trait CardRepository: Send + Sync {
    async fn find_by_hex(&self, card_hex: &str) -> Result<Option<Card>, ApiError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Card>, ApiError>;
    /// Insert a disabled card for an unrecognized hex id. ON CONFLICT DO
    /// NOTHING, so concurrent first scans of the same card are a no-op race.
    async fn register_unknown(&self, card_hex: &str) -> Result<(), ApiError>;
    /// Explicit registration; unique-key violation maps to `CardAlreadyExists`.
    async fn create(&self, card: &Card) -> Result<(), ApiError>;
    async fn list(&self) -> Result<Vec<Card>, ApiError>;
    async fn update(
        &self,
        id: Uuid,
        permission: Option<bool>,
        name: Option<&str>,
    ) -> Result<(), ApiError>;
    async fn delete(&self, id: Uuid) -> Result<bool, ApiError>;

    /// Resolve the user linked to a card via the user_cards join, with roles.
    async fn find_linked_user(&self, card_id: Uuid) -> Result<Option<UserWithRoles>, ApiError>;
    async fn is_linked(&self, user_id: Uuid, card_id: Uuid) -> Result<bool, ApiError>;
    async fn link_user(&self, user_id: Uuid, card_id: Uuid) -> Result<(), ApiError>;
    async fn unlink_user(&self, user_id: Uuid, card_id: Uuid) -> Result<bool, ApiError>;
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Card>, ApiError>;
}

/// Repository for physical controllers and their role assignments.
pub trait DeviceRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Device>, ApiError>;
    async fn find_by_mac_with_roles(&self, mac: &str) -> Result<Option<DeviceWithRoles>, ApiError>;
    async fn find_by_api_token(&self, api_token: &str) -> Result<Option<Device>, ApiError>;
    async fn list(&self) -> Result<Vec<Device>, ApiError>;
    async fn create(&self, device: &Device) -> Result<(), ApiError>;
    async fn update(&self, id: Uuid, patch: DevicePatch) -> Result<(), ApiError>;
    async fn delete(&self, id: Uuid) -> Result<bool, ApiError>;

    /// Create-or-find by MAC, storing `new_token` as the device's api token.
    async fn identify(&self, mac: &str, new_token: &str) -> Result<Device, ApiError>;
    async fn set_ip(&self, id: Uuid, ip: &str) -> Result<(), ApiError>;

    async fn roles(&self, device_id: Uuid) -> Result<Vec<Role>, ApiError>;
    async fn add_role(&self, device_id: Uuid, role_id: Uuid) -> Result<(), ApiError>;
    async fn remove_role(&self, device_id: Uuid, role_id: Uuid) -> Result<bool, ApiError>;
}

/// Repository for labs and standing memberships.
pub trait LabRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Lab>, ApiError>;
    async fn list(&self) -> Result<Vec<Lab>, ApiError>;
    async fn create(&self, lab: &Lab) -> Result<(), ApiError>;
    async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<(), ApiError>;
    async fn delete(&self, id: Uuid) -> Result<bool, ApiError>;

    /// The door device linked to this lab, if any.
    async fn find_device(&self, lab_id: Uuid) -> Result<Option<Device>, ApiError>;
    async fn find_member(&self, user_id: Uuid, lab_id: Uuid)
    -> Result<Option<LabMember>, ApiError>;
    /// Bulk-add members; existing (user, lab) pairs are skipped.
    async fn add_members(&self, lab_id: Uuid, members: &[(Uuid, bool)]) -> Result<(), ApiError>;
    async fn remove_members(&self, user_id: Uuid, lab_ids: &[Uuid]) -> Result<u64, ApiError>;
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Lab>, ApiError>;
}

/// Repository for roles and the User↔Role link.
pub trait RoleRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Role>, ApiError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, ApiError>;
    async fn list(&self) -> Result<Vec<Role>, ApiError>;
    async fn create(&self, role: &Role) -> Result<(), ApiError>;
    async fn update(&self, id: Uuid, name: &str) -> Result<(), ApiError>;
    async fn delete(&self, id: Uuid) -> Result<bool, ApiError>;

    async fn assign_user(&self, user_id: Uuid, role_id: Uuid) -> Result<(), ApiError>;
    async fn remove_user(&self, user_id: Uuid, role_id: Uuid) -> Result<bool, ApiError>;
}

/// Repository for temporary reservations.
pub trait ReservationRepository: Send + Sync {
    /// A reservation for (user, lab) whose `[start_time, end_time]` interval
    /// contains `at`, inclusive both ends.
    async fn find_active(
        &self,
        user_id: Uuid,
        lab_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<Reservation>, ApiError>;
    /// Any reservation for the lab overlapping `[start, end)`.
    async fn find_overlapping(
        &self,
        lab_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<Reservation>, ApiError>;
    async fn create(&self, reservation: &Reservation) -> Result<(), ApiError>;
    async fn list(&self) -> Result<Vec<Reservation>, ApiError>;
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Reservation>, ApiError>;
    async fn delete(&self, id: Uuid) -> Result<bool, ApiError>;
}

/// Append-only audit trail. There is deliberately no update or delete.
pub trait AccessLogRepository: Send + Sync {
    async fn append(
        &self,
        user_id: Uuid,
        device_id: Uuid,
        permission: bool,
    ) -> Result<AccessLog, ApiError>;
    /// Newest first.
    async fn list_by_device(
        &self,
        device_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<AccessLogEntry>, ApiError>;
}

/// Append-only meter samples.
pub trait MeterReadingRepository: Send + Sync {
    /// Most recent reading for (device, kind) in insertion order.
    async fn last(&self, device_id: Uuid, kind: i16) -> Result<Option<MeterReading>, ApiError>;
    async fn append(&self, reading: &MeterReading) -> Result<(), ApiError>;
    /// Up to `limit` most recent readings for (device, kind), newest first.
    async fn recent(
        &self,
        device_id: Uuid,
        kind: i16,
        limit: u64,
    ) -> Result<Vec<MeterReading>, ApiError>;
}

/// Outbound call to a door controller's unlock relay.
pub trait UnlockPort: Send + Sync {
    async fn trigger_unlock(&self, ip: &str, api_token: &str) -> Result<(), anyhow::Error>;
}
