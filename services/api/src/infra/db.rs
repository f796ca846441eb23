use std::collections::HashMap;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    ModelTrait as _, QueryFilter, QueryOrder, QuerySelect, sea_query::OnConflict,
};
use uuid::Uuid;

use morea_domain::pagination::PageRequest;
use morea_schema::{
    access_logs, cards, device_roles, devices, labs, meter_readings, reservations, roles,
    user_cards, user_labs, user_roles, users,
};

use crate::domain::repository::{
    AccessLogRepository, CardRepository, DevicePatch, DeviceRepository, LabRepository,
    MeterReadingRepository, ReservationRepository, RoleRepository, UserPatch, UserRepository,
};
use crate::domain::types::{
    AccessLog, AccessLogEntry, Card, Device, DeviceWithRoles, Lab, LabMember, MeterReading,
    Reservation, Role, User, UserWithRoles,
};
use crate::error::ApiError;

fn is_unique_violation(e: &sea_orm::DbErr) -> bool {
    matches!(
        e.sql_err(),
        Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
    )
}

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl DbUserRepository {
    async fn role_names_of(&self, user_id: Uuid) -> Result<Vec<String>, ApiError> {
        let links = user_roles::Entity::find()
            .filter(user_roles::Column::UserId.eq(user_id))
            .all(&self.db)
            .await
            .context("list user role links")?;
        let role_ids: Vec<Uuid> = links.into_iter().map(|l| l.role_id).collect();
        let models = roles::Entity::find()
            .filter(roles::Column::Id.is_in(role_ids))
            .all(&self.db)
            .await
            .context("list roles by ids")?;
        Ok(models.into_iter().map(|r| r.name).collect())
    }
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await
            .context("find user by username")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_pin(&self, pin: &str) -> Result<Option<UserWithRoles>, ApiError> {
        let Some(model) = users::Entity::find()
            .filter(users::Column::AccessPin.eq(pin))
            .one(&self.db)
            .await
            .context("find user by pin")?
        else {
            return Ok(None);
        };
        let role_names = self.role_names_of(model.id).await?;
        Ok(Some(UserWithRoles {
            user: user_from_model(model),
            role_names,
        }))
    }

    async fn role_names(&self, user_id: Uuid) -> Result<Vec<String>, ApiError> {
        self.role_names_of(user_id).await
    }

    async fn list(&self) -> Result<Vec<User>, ApiError> {
        let models = users::Entity::find()
            .order_by_asc(users::Column::Username)
            .all(&self.db)
            .await
            .context("list users")?;
        Ok(models.into_iter().map(user_from_model).collect())
    }

    async fn create(&self, user: &User) -> Result<(), ApiError> {
        users::ActiveModel {
            id: Set(user.id),
            username: Set(user.username.clone()),
            email: Set(user.email.clone()),
            password: Set(user.password_hash.clone()),
            is_active: Set(user.is_active),
            access_pin: Set(user.access_pin.clone()),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
        }
        .insert(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::EmailAlreadyExists
            } else {
                anyhow::Error::from(e).context("create user").into()
            }
        })?;
        Ok(())
    }

    async fn update(&self, id: Uuid, patch: UserPatch) -> Result<(), ApiError> {
        let mut am = users::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(username) = patch.username {
            am.username = Set(username);
        }
        if let Some(email) = patch.email {
            am.email = Set(email);
        }
        if let Some(password_hash) = patch.password_hash {
            am.password = Set(password_hash);
        }
        if let Some(is_active) = patch.is_active {
            am.is_active = Set(is_active);
        }
        if let Some(access_pin) = patch.access_pin {
            am.access_pin = Set(access_pin);
        }
        am.updated_at = Set(Utc::now());
        am.update(&self.db).await.map_err(|e| match e {
            sea_orm::DbErr::RecordNotUpdated => ApiError::UserNotFound,
            e => anyhow::Error::from(e).context("update user").into(),
        })?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let result = users::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete user")?;
        Ok(result.rows_affected > 0)
    }
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        username: model.username,
        email: model.email,
        password_hash: model.password,
        is_active: model.is_active,
        access_pin: model.access_pin,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Card repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCardRepository {
    pub db: DatabaseConnection,
}

impl CardRepository for DbCardRepository {
    async fn find_by_hex(&self, card_hex: &str) -> Result<Option<Card>, ApiError> {
        let model = cards::Entity::find()
            .filter(cards::Column::CardId.eq(card_hex))
            .one(&self.db)
            .await
            .context("find card by hex")?;
        Ok(model.map(card_from_model))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Card>, ApiError> {
        let model = cards::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find card by id")?;
        Ok(model.map(card_from_model))
    }

    async fn register_unknown(&self, card_hex: &str) -> Result<(), ApiError> {
        let am = cards::ActiveModel {
            id: Set(Uuid::new_v4()),
            card_id: Set(card_hex.to_owned()),
            permission: Set(false),
            name: Set(None),
            created_at: Set(Utc::now()),
        };
        cards::Entity::insert(am)
            .on_conflict(
                OnConflict::column(cards::Column::CardId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .context("register unknown card")?;
        Ok(())
    }

    async fn create(&self, card: &Card) -> Result<(), ApiError> {
        cards::ActiveModel {
            id: Set(card.id),
            card_id: Set(card.card_id.clone()),
            permission: Set(card.permission),
            name: Set(card.name.clone()),
            created_at: Set(card.created_at),
        }
        .insert(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::CardAlreadyExists
            } else {
                anyhow::Error::from(e).context("create card").into()
            }
        })?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Card>, ApiError> {
        let models = cards::Entity::find()
            .order_by_desc(cards::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list cards")?;
        Ok(models.into_iter().map(card_from_model).collect())
    }

    async fn update(
        &self,
        id: Uuid,
        permission: Option<bool>,
        name: Option<&str>,
    ) -> Result<(), ApiError> {
        let mut am = cards::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(permission) = permission {
            am.permission = Set(permission);
        }
        if let Some(name) = name {
            am.name = Set(Some(name.to_owned()));
        }
        am.update(&self.db).await.map_err(|e| match e {
            sea_orm::DbErr::RecordNotUpdated => ApiError::CardNotFound,
            e => anyhow::Error::from(e).context("update card").into(),
        })?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let result = cards::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete card")?;
        Ok(result.rows_affected > 0)
    }

    async fn find_linked_user(&self, card_id: Uuid) -> Result<Option<UserWithRoles>, ApiError> {
        let Some(link) = user_cards::Entity::find()
            .filter(user_cards::Column::CardId.eq(card_id))
            .one(&self.db)
            .await
            .context("find card link")?
        else {
            return Ok(None);
        };
        let Some(model) = users::Entity::find_by_id(link.user_id)
            .one(&self.db)
            .await
            .context("find linked user")?
        else {
            return Ok(None);
        };
        let role_names = model
            .find_related(roles::Entity)
            .all(&self.db)
            .await
            .context("list linked user roles")?
            .into_iter()
            .map(|r| r.name)
            .collect();
        Ok(Some(UserWithRoles {
            user: user_from_model(model),
            role_names,
        }))
    }

    async fn is_linked(&self, user_id: Uuid, card_id: Uuid) -> Result<bool, ApiError> {
        let link = user_cards::Entity::find_by_id((user_id, card_id))
            .one(&self.db)
            .await
            .context("find user card link")?;
        Ok(link.is_some())
    }

    async fn link_user(&self, user_id: Uuid, card_id: Uuid) -> Result<(), ApiError> {
        user_cards::ActiveModel {
            user_id: Set(user_id),
            card_id: Set(card_id),
        }
        .insert(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::CardAlreadyLinked
            } else {
                anyhow::Error::from(e).context("link card to user").into()
            }
        })?;
        Ok(())
    }

    async fn unlink_user(&self, user_id: Uuid, card_id: Uuid) -> Result<bool, ApiError> {
        let result = user_cards::Entity::delete_many()
            .filter(user_cards::Column::UserId.eq(user_id))
            .filter(user_cards::Column::CardId.eq(card_id))
            .exec(&self.db)
            .await
            .context("unlink card from user")?;
        Ok(result.rows_affected > 0)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Card>, ApiError> {
        let links = user_cards::Entity::find()
            .filter(user_cards::Column::UserId.eq(user_id))
            .all(&self.db)
            .await
            .context("list user card links")?;
        let card_ids: Vec<Uuid> = links.into_iter().map(|l| l.card_id).collect();
        let models = cards::Entity::find()
            .filter(cards::Column::Id.is_in(card_ids))
            .all(&self.db)
            .await
            .context("list cards for user")?;
        Ok(models.into_iter().map(card_from_model).collect())
    }
}

fn card_from_model(model: cards::Model) -> Card {
    Card {
        id: model.id,
        card_id: model.card_id,
        permission: model.permission,
        name: model.name,
        created_at: model.created_at,
    }
}

// ── Device repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbDeviceRepository {
    pub db: DatabaseConnection,
}

impl DeviceRepository for DbDeviceRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Device>, ApiError> {
        let model = devices::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find device by id")?;
        Ok(model.map(device_from_model))
    }

    async fn find_by_mac_with_roles(&self, mac: &str) -> Result<Option<DeviceWithRoles>, ApiError> {
        let Some(model) = devices::Entity::find()
            .filter(devices::Column::MacAddress.eq(mac))
            .one(&self.db)
            .await
            .context("find device by mac")?
        else {
            return Ok(None);
        };
        let role_names = model
            .find_related(roles::Entity)
            .all(&self.db)
            .await
            .context("list device roles")?
            .into_iter()
            .map(|r| r.name)
            .collect();
        Ok(Some(DeviceWithRoles {
            device: device_from_model(model),
            role_names,
        }))
    }

    async fn find_by_api_token(&self, api_token: &str) -> Result<Option<Device>, ApiError> {
        let model = devices::Entity::find()
            .filter(devices::Column::ApiToken.eq(api_token))
            .one(&self.db)
            .await
            .context("find device by api token")?;
        Ok(model.map(device_from_model))
    }

    async fn list(&self) -> Result<Vec<Device>, ApiError> {
        let models = devices::Entity::find()
            .order_by_desc(devices::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list devices")?;
        Ok(models.into_iter().map(device_from_model).collect())
    }

    async fn create(&self, device: &Device) -> Result<(), ApiError> {
        devices::ActiveModel {
            id: Set(device.id),
            mac_address: Set(device.mac_address.clone()),
            api_token: Set(device.api_token.clone()),
            ip_address: Set(device.ip_address.clone()),
            is_authorized: Set(device.is_authorized),
            kind: Set(device.kind.clone()),
            lab_id: Set(device.lab_id),
            created_at: Set(device.created_at),
        }
        .insert(&self.db)
        .await
        .context("create device")?;
        Ok(())
    }

    async fn update(&self, id: Uuid, patch: DevicePatch) -> Result<(), ApiError> {
        let mut am = devices::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(is_authorized) = patch.is_authorized {
            am.is_authorized = Set(is_authorized);
        }
        if let Some(kind) = patch.kind {
            am.kind = Set(kind);
        }
        if let Some(lab_id) = patch.lab_id {
            am.lab_id = Set(lab_id);
        }
        am.update(&self.db).await.map_err(|e| match e {
            sea_orm::DbErr::RecordNotUpdated => ApiError::DeviceNotFound,
            e => anyhow::Error::from(e).context("update device").into(),
        })?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let result = devices::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete device")?;
        Ok(result.rows_affected > 0)
    }

    async fn identify(&self, mac: &str, new_token: &str) -> Result<Device, ApiError> {
        let existing = devices::Entity::find()
            .filter(devices::Column::MacAddress.eq(mac))
            .one(&self.db)
            .await
            .context("find device for identify")?;

        let model = match existing {
            Some(row) => {
                let am = devices::ActiveModel {
                    id: Set(row.id),
                    api_token: Set(new_token.to_owned()),
                    ..Default::default()
                };
                am.update(&self.db).await.context("rotate device token")?
            }
            None => {
                devices::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    mac_address: Set(mac.to_owned()),
                    api_token: Set(new_token.to_owned()),
                    ip_address: Set(None),
                    is_authorized: Set(false),
                    kind: Set(None),
                    lab_id: Set(None),
                    created_at: Set(Utc::now()),
                }
                .insert(&self.db)
                .await
                .context("create device on identify")?
            }
        };
        Ok(device_from_model(model))
    }

    async fn set_ip(&self, id: Uuid, ip: &str) -> Result<(), ApiError> {
        let am = devices::ActiveModel {
            id: Set(id),
            ip_address: Set(Some(ip.to_owned())),
            ..Default::default()
        };
        am.update(&self.db).await.map_err(|e| match e {
            sea_orm::DbErr::RecordNotUpdated => ApiError::DeviceNotFound,
            e => anyhow::Error::from(e).context("set device ip").into(),
        })?;
        Ok(())
    }

    async fn roles(&self, device_id: Uuid) -> Result<Vec<Role>, ApiError> {
        let links = device_roles::Entity::find()
            .filter(device_roles::Column::DeviceId.eq(device_id))
            .all(&self.db)
            .await
            .context("list device role links")?;
        let role_ids: Vec<Uuid> = links.into_iter().map(|l| l.role_id).collect();
        let models = roles::Entity::find()
            .filter(roles::Column::Id.is_in(role_ids))
            .all(&self.db)
            .await
            .context("list roles for device")?;
        Ok(models.into_iter().map(role_from_model).collect())
    }

    async fn add_role(&self, device_id: Uuid, role_id: Uuid) -> Result<(), ApiError> {
        let am = device_roles::ActiveModel {
            device_id: Set(device_id),
            role_id: Set(role_id),
        };
        device_roles::Entity::insert(am)
            .on_conflict(
                OnConflict::columns([
                    device_roles::Column::DeviceId,
                    device_roles::Column::RoleId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .context("add device role")?;
        Ok(())
    }

    async fn remove_role(&self, device_id: Uuid, role_id: Uuid) -> Result<bool, ApiError> {
        let result = device_roles::Entity::delete_many()
            .filter(device_roles::Column::DeviceId.eq(device_id))
            .filter(device_roles::Column::RoleId.eq(role_id))
            .exec(&self.db)
            .await
            .context("remove device role")?;
        Ok(result.rows_affected > 0)
    }
}

fn device_from_model(model: devices::Model) -> Device {
    Device {
        id: model.id,
        mac_address: model.mac_address,
        api_token: model.api_token,
        ip_address: model.ip_address,
        is_authorized: model.is_authorized,
        kind: model.kind,
        lab_id: model.lab_id,
        created_at: model.created_at,
    }
}

// ── Lab repository ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbLabRepository {
    pub db: DatabaseConnection,
}

impl LabRepository for DbLabRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Lab>, ApiError> {
        let model = labs::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find lab by id")?;
        Ok(model.map(lab_from_model))
    }

    async fn list(&self) -> Result<Vec<Lab>, ApiError> {
        let models = labs::Entity::find()
            .order_by_asc(labs::Column::Name)
            .all(&self.db)
            .await
            .context("list labs")?;
        Ok(models.into_iter().map(lab_from_model).collect())
    }

    async fn create(&self, lab: &Lab) -> Result<(), ApiError> {
        labs::ActiveModel {
            id: Set(lab.id),
            name: Set(lab.name.clone()),
            description: Set(lab.description.clone()),
            created_at: Set(lab.created_at),
        }
        .insert(&self.db)
        .await
        .context("create lab")?;
        Ok(())
    }

    async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<(), ApiError> {
        let mut am = labs::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(name) = name {
            am.name = Set(name.to_owned());
        }
        if let Some(description) = description {
            am.description = Set(Some(description.to_owned()));
        }
        am.update(&self.db).await.map_err(|e| match e {
            sea_orm::DbErr::RecordNotUpdated => ApiError::LabNotFound,
            e => anyhow::Error::from(e).context("update lab").into(),
        })?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let result = labs::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete lab")?;
        Ok(result.rows_affected > 0)
    }

    async fn find_device(&self, lab_id: Uuid) -> Result<Option<Device>, ApiError> {
        let model = devices::Entity::find()
            .filter(devices::Column::LabId.eq(lab_id))
            .one(&self.db)
            .await
            .context("find lab device")?;
        Ok(model.map(device_from_model))
    }

    async fn find_member(
        &self,
        user_id: Uuid,
        lab_id: Uuid,
    ) -> Result<Option<LabMember>, ApiError> {
        let model = user_labs::Entity::find_by_id((user_id, lab_id))
            .one(&self.db)
            .await
            .context("find lab member")?;
        Ok(model.map(|m| LabMember {
            user_id: m.user_id,
            lab_id: m.lab_id,
            is_staff: m.is_staff,
        }))
    }

    async fn add_members(&self, lab_id: Uuid, members: &[(Uuid, bool)]) -> Result<(), ApiError> {
        if members.is_empty() {
            return Ok(());
        }
        let rows = members.iter().map(|(user_id, is_staff)| user_labs::ActiveModel {
            user_id: Set(*user_id),
            lab_id: Set(lab_id),
            is_staff: Set(*is_staff),
        });
        user_labs::Entity::insert_many(rows)
            .on_conflict(
                OnConflict::columns([user_labs::Column::UserId, user_labs::Column::LabId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .context("add lab members")?;
        Ok(())
    }

    async fn remove_members(&self, user_id: Uuid, lab_ids: &[Uuid]) -> Result<u64, ApiError> {
        let result = user_labs::Entity::delete_many()
            .filter(user_labs::Column::UserId.eq(user_id))
            .filter(user_labs::Column::LabId.is_in(lab_ids.iter().copied()))
            .exec(&self.db)
            .await
            .context("remove lab members")?;
        Ok(result.rows_affected)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Lab>, ApiError> {
        let links = user_labs::Entity::find()
            .filter(user_labs::Column::UserId.eq(user_id))
            .all(&self.db)
            .await
            .context("list user lab links")?;
        let lab_ids: Vec<Uuid> = links.into_iter().map(|l| l.lab_id).collect();
        let models = labs::Entity::find()
            .filter(labs::Column::Id.is_in(lab_ids))
            .all(&self.db)
            .await
            .context("list labs for user")?;
        Ok(models.into_iter().map(lab_from_model).collect())
    }
}

fn lab_from_model(model: labs::Model) -> Lab {
    Lab {
        id: model.id,
        name: model.name,
        description: model.description,
        created_at: model.created_at,
    }
}

// ── Role repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbRoleRepository {
    pub db: DatabaseConnection,
}

impl RoleRepository for DbRoleRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Role>, ApiError> {
        let model = roles::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find role by id")?;
        Ok(model.map(role_from_model))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, ApiError> {
        let model = roles::Entity::find()
            .filter(roles::Column::Name.eq(name))
            .one(&self.db)
            .await
            .context("find role by name")?;
        Ok(model.map(role_from_model))
    }

    async fn list(&self) -> Result<Vec<Role>, ApiError> {
        let models = roles::Entity::find()
            .order_by_asc(roles::Column::Name)
            .all(&self.db)
            .await
            .context("list roles")?;
        Ok(models.into_iter().map(role_from_model).collect())
    }

    async fn create(&self, role: &Role) -> Result<(), ApiError> {
        roles::ActiveModel {
            id: Set(role.id),
            name: Set(role.name.clone()),
        }
        .insert(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::RoleAlreadyExists
            } else {
                anyhow::Error::from(e).context("create role").into()
            }
        })?;
        Ok(())
    }

    async fn update(&self, id: Uuid, name: &str) -> Result<(), ApiError> {
        let am = roles::ActiveModel {
            id: Set(id),
            name: Set(name.to_owned()),
        };
        am.update(&self.db).await.map_err(|e| match e {
            sea_orm::DbErr::RecordNotUpdated => ApiError::RoleNotFound,
            e => anyhow::Error::from(e).context("update role").into(),
        })?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let result = roles::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete role")?;
        Ok(result.rows_affected > 0)
    }

    async fn assign_user(&self, user_id: Uuid, role_id: Uuid) -> Result<(), ApiError> {
        let am = user_roles::ActiveModel {
            user_id: Set(user_id),
            role_id: Set(role_id),
        };
        user_roles::Entity::insert(am)
            .on_conflict(
                OnConflict::columns([user_roles::Column::UserId, user_roles::Column::RoleId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .context("assign role to user")?;
        Ok(())
    }

    async fn remove_user(&self, user_id: Uuid, role_id: Uuid) -> Result<bool, ApiError> {
        let result = user_roles::Entity::delete_many()
            .filter(user_roles::Column::UserId.eq(user_id))
            .filter(user_roles::Column::RoleId.eq(role_id))
            .exec(&self.db)
            .await
            .context("remove role from user")?;
        Ok(result.rows_affected > 0)
    }
}

fn role_from_model(model: roles::Model) -> Role {
    Role {
        id: model.id,
        name: model.name,
    }
}

// ── Reservation repository ───────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbReservationRepository {
    pub db: DatabaseConnection,
}

impl ReservationRepository for DbReservationRepository {
    async fn find_active(
        &self,
        user_id: Uuid,
        lab_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<Reservation>, ApiError> {
        let model = reservations::Entity::find()
            .filter(reservations::Column::UserId.eq(user_id))
            .filter(reservations::Column::LabId.eq(lab_id))
            .filter(reservations::Column::StartTime.lte(at))
            .filter(reservations::Column::EndTime.gte(at))
            .one(&self.db)
            .await
            .context("find active reservation")?;
        Ok(model.map(reservation_from_model))
    }

    async fn find_overlapping(
        &self,
        lab_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<Reservation>, ApiError> {
        let model = reservations::Entity::find()
            .filter(reservations::Column::LabId.eq(lab_id))
            .filter(reservations::Column::StartTime.lt(end))
            .filter(reservations::Column::EndTime.gt(start))
            .one(&self.db)
            .await
            .context("find overlapping reservation")?;
        Ok(model.map(reservation_from_model))
    }

    async fn create(&self, reservation: &Reservation) -> Result<(), ApiError> {
        reservations::ActiveModel {
            id: Set(reservation.id),
            user_id: Set(reservation.user_id),
            lab_id: Set(reservation.lab_id),
            start_time: Set(reservation.start_time),
            end_time: Set(reservation.end_time),
            created_at: Set(reservation.created_at),
        }
        .insert(&self.db)
        .await
        .context("create reservation")?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Reservation>, ApiError> {
        let models = reservations::Entity::find()
            .order_by_desc(reservations::Column::StartTime)
            .all(&self.db)
            .await
            .context("list reservations")?;
        Ok(models.into_iter().map(reservation_from_model).collect())
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Reservation>, ApiError> {
        let models = reservations::Entity::find()
            .filter(reservations::Column::UserId.eq(user_id))
            .order_by_desc(reservations::Column::StartTime)
            .all(&self.db)
            .await
            .context("list reservations by user")?;
        Ok(models.into_iter().map(reservation_from_model).collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let result = reservations::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete reservation")?;
        Ok(result.rows_affected > 0)
    }
}

fn reservation_from_model(model: reservations::Model) -> Reservation {
    Reservation {
        id: model.id,
        user_id: model.user_id,
        lab_id: model.lab_id,
        start_time: model.start_time,
        end_time: model.end_time,
        created_at: model.created_at,
    }
}

// ── Access log repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAccessLogRepository {
    pub db: DatabaseConnection,
}

impl AccessLogRepository for DbAccessLogRepository {
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
        access_logs::ActiveModel {
            id: Set(log.id),
            user_id: Set(log.user_id),
            device_id: Set(log.device_id),
            permission: Set(log.permission),
            created_at: Set(log.created_at),
        }
        .insert(&self.db)
        .await
        .context("append access log")?;
        Ok(log)
    }

    async fn list_by_device(
        &self,
        device_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<AccessLogEntry>, ApiError> {
        let PageRequest { per_page, page } = page.clamped();
        let models = access_logs::Entity::find()
            .filter(access_logs::Column::DeviceId.eq(device_id))
            .order_by_desc(access_logs::Column::CreatedAt)
            .offset(((page - 1) * per_page) as u64)
            .limit(per_page as u64)
            .all(&self.db)
            .await
            .context("list access logs by device")?;

        let user_ids: Vec<Uuid> = models.iter().map(|m| m.user_id).collect();
        let usernames: HashMap<Uuid, String> = users::Entity::find()
            .filter(users::Column::Id.is_in(user_ids))
            .all(&self.db)
            .await
            .context("resolve usernames for access logs")?
            .into_iter()
            .map(|u| (u.id, u.username))
            .collect();

        Ok(models
            .into_iter()
            .map(|m| AccessLogEntry {
                username: usernames.get(&m.user_id).cloned().unwrap_or_default(),
                log: AccessLog {
                    id: m.id,
                    user_id: m.user_id,
                    device_id: m.device_id,
                    permission: m.permission,
                    created_at: m.created_at,
                },
            })
            .collect())
    }
}

// ── Meter reading repository ─────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbMeterReadingRepository {
    pub db: DatabaseConnection,
}

impl MeterReadingRepository for DbMeterReadingRepository {
    async fn last(&self, device_id: Uuid, kind: i16) -> Result<Option<MeterReading>, ApiError> {
        // UUIDv7 ids sort by insertion time.
        let model = meter_readings::Entity::find()
            .filter(meter_readings::Column::DeviceId.eq(device_id))
            .filter(meter_readings::Column::Kind.eq(kind))
            .order_by_desc(meter_readings::Column::Id)
            .one(&self.db)
            .await
            .context("find last meter reading")?;
        Ok(model.map(meter_reading_from_model))
    }

    async fn append(&self, reading: &MeterReading) -> Result<(), ApiError> {
        meter_readings::ActiveModel {
            id: Set(reading.id),
            device_id: Set(reading.device_id),
            kind: Set(reading.kind),
            value: Set(reading.value),
            total: Set(reading.total),
            collected_at: Set(reading.collected_at),
        }
        .insert(&self.db)
        .await
        .context("append meter reading")?;
        Ok(())
    }

    async fn recent(
        &self,
        device_id: Uuid,
        kind: i16,
        limit: u64,
    ) -> Result<Vec<MeterReading>, ApiError> {
        let models = meter_readings::Entity::find()
            .filter(meter_readings::Column::DeviceId.eq(device_id))
            .filter(meter_readings::Column::Kind.eq(kind))
            .order_by_desc(meter_readings::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .context("list recent meter readings")?;
        Ok(models.into_iter().map(meter_reading_from_model).collect())
    }
}

fn meter_reading_from_model(model: meter_readings::Model) -> MeterReading {
    MeterReading {
        id: model.id,
        device_id: model.device_id,
        kind: model.kind,
        value: model.value,
        total: model.total,
        collected_at: model.collected_at,
    }
}
