use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use morea_api::domain::repository::{
    AccessLogRepository, CardRepository, DevicePatch, DeviceRepository, LabRepository,
    MeterReadingRepository, ReservationRepository, UnlockPort, UserPatch, UserRepository,
};
use morea_api::domain::types::{
    AccessLog, AccessLogEntry, Card, Device, DeviceWithRoles, Lab, LabMember, MeterReading,
    Reservation, Role, User, UserWithRoles,
};
use morea_api::error::ApiError;
use morea_domain::pagination::PageRequest;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-for-unit-tests-only";

// ── MockUserRepo ─────────────────────────────────────────────────────────────

pub struct MockUserRepo {
    pub users: Arc<Mutex<Vec<UserWithRoles>>>,
}

impl MockUserRepo {
    pub fn new(users: Vec<UserWithRoles>) -> Self {
        Self {
            users: Arc::new(Mutex::new(users)),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Shared handle for post-execution inspection.
    pub fn users_handle(&self) -> Arc<Mutex<Vec<UserWithRoles>>> {
        Arc::clone(&self.users)
    }
}

impl UserRepository for MockUserRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.user.id == id)
            .map(|u| u.user.clone()))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.user.username == username)
            .map(|u| u.user.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.user.email == email)
            .map(|u| u.user.clone()))
    }

    async fn find_by_pin(&self, pin: &str) -> Result<Option<UserWithRoles>, ApiError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.user.access_pin.as_deref() == Some(pin))
            .cloned())
    }

    async fn role_names(&self, user_id: Uuid) -> Result<Vec<String>, ApiError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.user.id == user_id)
            .map(|u| u.role_names.clone())
            .unwrap_or_default())
    }

    async fn list(&self) -> Result<Vec<User>, ApiError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .map(|u| u.user.clone())
            .collect())
    }

    async fn create(&self, user: &User) -> Result<(), ApiError> {
        self.users.lock().unwrap().push(UserWithRoles {
            user: user.clone(),
            role_names: vec![],
        });
        Ok(())
    }

    async fn update(&self, _id: Uuid, _patch: UserPatch) -> Result<(), ApiError> {
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.user.id != id);
        Ok(users.len() < before)
    }
}

// ── MockCardRepo ─────────────────────────────────────────────────────────────

pub struct MockCardRepo {
    pub cards: Arc<Mutex<Vec<Card>>>,
    pub links: Arc<Mutex<Vec<(Uuid, Uuid)>>>,
    pub users: Vec<UserWithRoles>,
}

impl MockCardRepo {
    pub fn new(cards: Vec<Card>, links: Vec<(Uuid, Uuid)>, users: Vec<UserWithRoles>) -> Self {
        Self {
            cards: Arc::new(Mutex::new(cards)),
            links: Arc::new(Mutex::new(links)),
            users,
        }
    }

    pub fn cards_handle(&self) -> Arc<Mutex<Vec<Card>>> {
        Arc::clone(&self.cards)
    }
}

impl CardRepository for MockCardRepo {
    async fn find_by_hex(&self, card_hex: &str) -> Result<Option<Card>, ApiError> {
        Ok(self
            .cards
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.card_id == card_hex)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Card>, ApiError> {
        Ok(self
            .cards
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn register_unknown(&self, card_hex: &str) -> Result<(), ApiError> {
        let mut cards = self.cards.lock().unwrap();
        // Mirrors ON CONFLICT DO NOTHING on the unique hex id.
        if cards.iter().any(|c| c.card_id == card_hex) {
            return Ok(());
        }
        cards.push(Card {
            id: Uuid::new_v4(),
            card_id: card_hex.to_owned(),
            permission: false,
            name: None,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn create(&self, card: &Card) -> Result<(), ApiError> {
        let mut cards = self.cards.lock().unwrap();
        if cards.iter().any(|c| c.card_id == card.card_id) {
            return Err(ApiError::CardAlreadyExists);
        }
        cards.push(card.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Card>, ApiError> {
        Ok(self.cards.lock().unwrap().clone())
    }

    async fn update(
        &self,
        id: Uuid,
        permission: Option<bool>,
        name: Option<&str>,
    ) -> Result<(), ApiError> {
        let mut cards = self.cards.lock().unwrap();
        let card = cards
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(ApiError::CardNotFound)?;
        if let Some(permission) = permission {
            card.permission = permission;
        }
        if let Some(name) = name {
            card.name = Some(name.to_owned());
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let mut cards = self.cards.lock().unwrap();
        let before = cards.len();
        cards.retain(|c| c.id != id);
        Ok(cards.len() < before)
    }

    async fn find_linked_user(&self, card_id: Uuid) -> Result<Option<UserWithRoles>, ApiError> {
        let links = self.links.lock().unwrap();
        let Some((user_id, _)) = links.iter().find(|(_, c)| *c == card_id) else {
            return Ok(None);
        };
        Ok(self.users.iter().find(|u| u.user.id == *user_id).cloned())
    }

    async fn is_linked(&self, user_id: Uuid, card_id: Uuid) -> Result<bool, ApiError> {
        Ok(self
            .links
            .lock()
            .unwrap()
            .contains(&(user_id, card_id)))
    }

    async fn link_user(&self, user_id: Uuid, card_id: Uuid) -> Result<(), ApiError> {
        self.links.lock().unwrap().push((user_id, card_id));
        Ok(())
    }

    async fn unlink_user(&self, user_id: Uuid, card_id: Uuid) -> Result<bool, ApiError> {
        let mut links = self.links.lock().unwrap();
        let before = links.len();
        links.retain(|l| *l != (user_id, card_id));
        Ok(links.len() < before)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Card>, ApiError> {
        let links = self.links.lock().unwrap();
        let cards = self.cards.lock().unwrap();
        Ok(cards
            .iter()
            .filter(|c| links.contains(&(user_id, c.id)))
            .cloned()
            .collect())
    }
}

// ── MockDeviceRepo ───────────────────────────────────────────────────────────

pub struct MockDeviceRepo {
    pub devices: Arc<Mutex<Vec<DeviceWithRoles>>>,
}

impl MockDeviceRepo {
    pub fn new(devices: Vec<DeviceWithRoles>) -> Self {
        Self {
            devices: Arc::new(Mutex::new(devices)),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }
}

impl DeviceRepository for MockDeviceRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Device>, ApiError> {
        Ok(self
            .devices
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.device.id == id)
            .map(|d| d.device.clone()))
    }

    async fn find_by_mac_with_roles(&self, mac: &str) -> Result<Option<DeviceWithRoles>, ApiError> {
        Ok(self
            .devices
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.device.mac_address == mac)
            .cloned())
    }

    async fn find_by_api_token(&self, api_token: &str) -> Result<Option<Device>, ApiError> {
        Ok(self
            .devices
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.device.api_token == api_token)
            .map(|d| d.device.clone()))
    }

    async fn list(&self) -> Result<Vec<Device>, ApiError> {
        Ok(self
            .devices
            .lock()
            .unwrap()
            .iter()
            .map(|d| d.device.clone())
            .collect())
    }

    async fn create(&self, device: &Device) -> Result<(), ApiError> {
        self.devices.lock().unwrap().push(DeviceWithRoles {
            device: device.clone(),
            role_names: vec![],
        });
        Ok(())
    }

    async fn update(&self, _id: Uuid, _patch: DevicePatch) -> Result<(), ApiError> {
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let mut devices = self.devices.lock().unwrap();
        let before = devices.len();
        devices.retain(|d| d.device.id != id);
        Ok(devices.len() < before)
    }

    async fn identify(&self, mac: &str, new_token: &str) -> Result<Device, ApiError> {
        let mut devices = self.devices.lock().unwrap();
        if let Some(d) = devices.iter_mut().find(|d| d.device.mac_address == mac) {
            d.device.api_token = new_token.to_owned();
            return Ok(d.device.clone());
        }
        let device = Device {
            id: Uuid::new_v4(),
            mac_address: mac.to_owned(),
            api_token: new_token.to_owned(),
            ip_address: None,
            is_authorized: false,
            kind: None,
            lab_id: None,
            created_at: Utc::now(),
        };
        devices.push(DeviceWithRoles {
            device: device.clone(),
            role_names: vec![],
        });
        Ok(device)
    }

    async fn set_ip(&self, id: Uuid, ip: &str) -> Result<(), ApiError> {
        let mut devices = self.devices.lock().unwrap();
        let device = devices
            .iter_mut()
            .find(|d| d.device.id == id)
            .ok_or(ApiError::DeviceNotFound)?;
        device.device.ip_address = Some(ip.to_owned());
        Ok(())
    }

    async fn roles(&self, _device_id: Uuid) -> Result<Vec<Role>, ApiError> {
        Ok(vec![])
    }

    async fn add_role(&self, _device_id: Uuid, _role_id: Uuid) -> Result<(), ApiError> {
        Ok(())
    }

    async fn remove_role(&self, _device_id: Uuid, _role_id: Uuid) -> Result<bool, ApiError> {
        Ok(false)
    }
}

// ── MockLabRepo ──────────────────────────────────────────────────────────────

pub struct MockLabRepo {
    pub labs: Vec<Lab>,
    pub members: Arc<Mutex<Vec<LabMember>>>,
    pub devices: Vec<Device>,
}

impl MockLabRepo {
    pub fn new(labs: Vec<Lab>, members: Vec<LabMember>, devices: Vec<Device>) -> Self {
        Self {
            labs,
            members: Arc::new(Mutex::new(members)),
            devices,
        }
    }

    pub fn members_handle(&self) -> Arc<Mutex<Vec<LabMember>>> {
        Arc::clone(&self.members)
    }
}

impl LabRepository for MockLabRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Lab>, ApiError> {
        Ok(self.labs.iter().find(|l| l.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Lab>, ApiError> {
        Ok(self.labs.clone())
    }

    async fn create(&self, _lab: &Lab) -> Result<(), ApiError> {
        Ok(())
    }

    async fn update(
        &self,
        _id: Uuid,
        _name: Option<&str>,
        _description: Option<&str>,
    ) -> Result<(), ApiError> {
        Ok(())
    }

    async fn delete(&self, _id: Uuid) -> Result<bool, ApiError> {
        Ok(false)
    }

    async fn find_device(&self, lab_id: Uuid) -> Result<Option<Device>, ApiError> {
        Ok(self.devices.iter().find(|d| d.lab_id == Some(lab_id)).cloned())
    }

    async fn find_member(
        &self,
        user_id: Uuid,
        lab_id: Uuid,
    ) -> Result<Option<LabMember>, ApiError> {
        Ok(self
            .members
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.user_id == user_id && m.lab_id == lab_id)
            .copied())
    }

    async fn add_members(&self, lab_id: Uuid, members: &[(Uuid, bool)]) -> Result<(), ApiError> {
        let mut existing = self.members.lock().unwrap();
        for (user_id, is_staff) in members {
            if existing
                .iter()
                .any(|m| m.user_id == *user_id && m.lab_id == lab_id)
            {
                continue;
            }
            existing.push(LabMember {
                user_id: *user_id,
                lab_id,
                is_staff: *is_staff,
            });
        }
        Ok(())
    }

    async fn remove_members(&self, user_id: Uuid, lab_ids: &[Uuid]) -> Result<u64, ApiError> {
        let mut members = self.members.lock().unwrap();
        let before = members.len();
        members.retain(|m| !(m.user_id == user_id && lab_ids.contains(&m.lab_id)));
        Ok((before - members.len()) as u64)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Lab>, ApiError> {
        let members = self.members.lock().unwrap();
        Ok(self
            .labs
            .iter()
            .filter(|l| members.iter().any(|m| m.user_id == user_id && m.lab_id == l.id))
            .cloned()
            .collect())
    }
}

// ── MockReservationRepo ──────────────────────────────────────────────────────

pub struct MockReservationRepo {
    pub reservations: Arc<Mutex<Vec<Reservation>>>,
}

impl MockReservationRepo {
    pub fn new(reservations: Vec<Reservation>) -> Self {
        Self {
            reservations: Arc::new(Mutex::new(reservations)),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    pub fn reservations_handle(&self) -> Arc<Mutex<Vec<Reservation>>> {
        Arc::clone(&self.reservations)
    }
}

impl ReservationRepository for MockReservationRepo {
    async fn find_active(
        &self,
        user_id: Uuid,
        lab_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<Reservation>, ApiError> {
        Ok(self
            .reservations
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.user_id == user_id && r.lab_id == lab_id && r.contains(at))
            .cloned())
    }

    async fn find_overlapping(
        &self,
        lab_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<Reservation>, ApiError> {
        Ok(self
            .reservations
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.lab_id == lab_id && r.start_time < end && r.end_time > start)
            .cloned())
    }

    async fn create(&self, reservation: &Reservation) -> Result<(), ApiError> {
        self.reservations.lock().unwrap().push(reservation.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Reservation>, ApiError> {
        Ok(self.reservations.lock().unwrap().clone())
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Reservation>, ApiError> {
        Ok(self
            .reservations
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let mut reservations = self.reservations.lock().unwrap();
        let before = reservations.len();
        reservations.retain(|r| r.id != id);
        Ok(reservations.len() < before)
    }
}

// ── MockAccessLogRepo ────────────────────────────────────────────────────────

pub struct MockAccessLogRepo {
    pub logs: Arc<Mutex<Vec<AccessLog>>>,
}

impl MockAccessLogRepo {
    pub fn empty() -> Self {
        Self {
            logs: Arc::new(Mutex::new(vec![])),
        }
    }

    pub fn logs_handle(&self) -> Arc<Mutex<Vec<AccessLog>>> {
        Arc::clone(&self.logs)
    }
}

impl AccessLogRepository for MockAccessLogRepo {
    async fn append(
        &self,
        user_id: Uuid,
        device_id: Uuid,
        permission: bool,
    ) -> Result<AccessLog, ApiError> {
        let log = AccessLog {
            id: Uuid::now_v7(),
            user_id,
            device_id,
            permission,
            created_at: Utc::now(),
        };
        self.logs.lock().unwrap().push(log.clone());
        Ok(log)
    }

    async fn list_by_device(
        &self,
        device_id: Uuid,
        _page: PageRequest,
    ) -> Result<Vec<AccessLogEntry>, ApiError> {
        Ok(self
            .logs
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.device_id == device_id)
            .map(|l| AccessLogEntry {
                log: l.clone(),
                username: String::new(),
            })
            .collect())
    }
}

// ── MockMeterReadingRepo ─────────────────────────────────────────────────────

pub struct MockMeterReadingRepo {
    pub readings: Arc<Mutex<Vec<MeterReading>>>,
}

impl MockMeterReadingRepo {
    pub fn empty() -> Self {
        Self {
            readings: Arc::new(Mutex::new(vec![])),
        }
    }

    pub fn new(readings: Vec<MeterReading>) -> Self {
        Self {
            readings: Arc::new(Mutex::new(readings)),
        }
    }

    pub fn readings_handle(&self) -> Arc<Mutex<Vec<MeterReading>>> {
        Arc::clone(&self.readings)
    }
}

impl MeterReadingRepository for MockMeterReadingRepo {
    async fn last(&self, device_id: Uuid, kind: i16) -> Result<Option<MeterReading>, ApiError> {
        Ok(self
            .readings
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.device_id == device_id && r.kind == kind)
            .next_back()
            .cloned())
    }

    async fn append(&self, reading: &MeterReading) -> Result<(), ApiError> {
        self.readings.lock().unwrap().push(reading.clone());
        Ok(())
    }

    async fn recent(
        &self,
        device_id: Uuid,
        kind: i16,
        limit: u64,
    ) -> Result<Vec<MeterReading>, ApiError> {
        // Newest first, like the database query.
        let readings = self.readings.lock().unwrap();
        Ok(readings
            .iter()
            .filter(|r| r.device_id == device_id && r.kind == kind)
            .rev()
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

// ── MockUnlockPort ───────────────────────────────────────────────────────────

pub struct MockUnlockPort {
    pub calls: Arc<Mutex<Vec<(String, String)>>>,
    pub fail: bool,
}

impl MockUnlockPort {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(vec![])),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            calls: Arc::new(Mutex::new(vec![])),
            fail: true,
        }
    }

    pub fn calls_handle(&self) -> Arc<Mutex<Vec<(String, String)>>> {
        Arc::clone(&self.calls)
    }
}

impl UnlockPort for MockUnlockPort {
    async fn trigger_unlock(&self, ip: &str, api_token: &str) -> Result<(), anyhow::Error> {
        self.calls
            .lock()
            .unwrap()
            .push((ip.to_owned(), api_token.to_owned()));
        if self.fail {
            anyhow::bail!("controller unreachable");
        }
        Ok(())
    }
}

// ── Test fixture helpers ─────────────────────────────────────────────────────

pub fn test_user(username: &str, roles: &[&str]) -> UserWithRoles {
    let now = Utc::now();
    UserWithRoles {
        user: User {
            id: Uuid::new_v4(),
            username: username.to_owned(),
            email: format!("{username}@example.com"),
            password_hash: String::new(),
            is_active: true,
            access_pin: None,
            created_at: now,
            updated_at: now,
        },
        role_names: roles.iter().map(|s| s.to_string()).collect(),
    }
}

pub fn test_device(mac: &str, roles: &[&str]) -> DeviceWithRoles {
    DeviceWithRoles {
        device: Device {
            id: Uuid::new_v4(),
            mac_address: mac.to_owned(),
            api_token: "device-token".to_owned(),
            ip_address: Some("10.0.0.20".to_owned()),
            is_authorized: true,
            kind: None,
            lab_id: None,
            created_at: Utc::now(),
        },
        role_names: roles.iter().map(|s| s.to_string()).collect(),
    }
}

pub fn test_card(hex: &str, permission: bool) -> Card {
    Card {
        id: Uuid::new_v4(),
        card_id: hex.to_owned(),
        permission,
        name: None,
        created_at: Utc::now(),
    }
}

pub fn test_lab(name: &str) -> Lab {
    Lab {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        description: None,
        created_at: Utc::now(),
    }
}

pub fn test_reservation(user_id: Uuid, lab_id: Uuid, hours_ago: i64, hours_ahead: i64) -> Reservation {
    let now = Utc::now();
    Reservation {
        id: Uuid::new_v4(),
        user_id,
        lab_id,
        start_time: now - chrono::Duration::hours(hours_ago),
        end_time: now + chrono::Duration::hours(hours_ahead),
        created_at: now,
    }
}
