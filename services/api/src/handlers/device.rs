use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use morea_domain::access::{STAFF, SUPERUSER};
use morea_domain::pagination::PageRequest;

use crate::domain::repository::{AccessLogRepository, DevicePatch, DeviceRepository};
use crate::domain::types::Device;
use crate::error::ApiError;
use crate::identity::Identity;
use crate::state::AppState;
use crate::usecase::device::{IdentifyDeviceUseCase, SetDeviceIpUseCase};

// ── Response types ───────────────────────────────────────────────────────────

/// Admin view of a controller. The api token stays server-side.
#[derive(Serialize)]
pub struct DeviceResponse {
    pub id: String,
    pub mac_address: String,
    pub ip_address: Option<String>,
    pub is_authorized: bool,
    pub kind: Option<String>,
    pub lab_id: Option<String>,
    #[serde(serialize_with = "morea_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Device> for DeviceResponse {
    fn from(device: Device) -> Self {
        Self {
            id: device.id.to_string(),
            mac_address: device.mac_address,
            ip_address: device.ip_address,
            is_authorized: device.is_authorized,
            kind: device.kind,
            lab_id: device.lab_id.map(|id| id.to_string()),
            created_at: device.created_at,
        }
    }
}

// ── POST /devices/identify ───────────────────────────────────────────────────

/// Field names are fixed by deployed controller firmware.
#[derive(Deserialize)]
pub struct IdentifyRequest {
    #[serde(rename = "macAddress")]
    pub mac_address: String,
}

#[derive(Serialize)]
pub struct IdentifyResponse {
    pub id: String,
    pub api_token: String,
}

pub async fn identify_device(
    State(state): State<AppState>,
    Json(body): Json<IdentifyRequest>,
) -> Result<Json<IdentifyResponse>, ApiError> {
    let usecase = IdentifyDeviceUseCase {
        devices: state.device_repo(),
    };
    let device = usecase.execute(&body.mac_address).await?;
    Ok(Json(IdentifyResponse {
        id: device.id.to_string(),
        api_token: device.api_token,
    }))
}

// ── POST /devices/ip ─────────────────────────────────────────────────────────

/// Firmware also sends a `deviceId` field; the token alone identifies the
/// device.
#[derive(Deserialize)]
pub struct ReportIpRequest {
    #[serde(rename = "apiToken")]
    pub api_token: String,
    #[serde(rename = "deviceIp")]
    pub ip_address: String,
}

pub async fn report_device_ip(
    State(state): State<AppState>,
    Json(body): Json<ReportIpRequest>,
) -> Result<StatusCode, ApiError> {
    let usecase = SetDeviceIpUseCase {
        devices: state.device_repo(),
    };
    usecase.execute(&body.api_token, &body.ip_address).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── GET /devices ─────────────────────────────────────────────────────────────

pub async fn get_devices(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<Vec<DeviceResponse>>, ApiError> {
    identity.require_any(&[SUPERUSER, STAFF])?;
    let devices = state.device_repo().list().await?;
    Ok(Json(devices.into_iter().map(DeviceResponse::from).collect()))
}

// ── GET /devices/{id} ────────────────────────────────────────────────────────

pub async fn get_device(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeviceResponse>, ApiError> {
    identity.require_any(&[SUPERUSER, STAFF])?;
    let device = state
        .device_repo()
        .find_by_id(id)
        .await?
        .ok_or(ApiError::DeviceNotFound)?;
    Ok(Json(device.into()))
}

// ── PATCH /devices/{id} ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateDeviceRequest {
    pub is_authorized: Option<bool>,
    #[serde(default, deserialize_with = "crate::handlers::user::double_option")]
    pub kind: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::handlers::user::double_option")]
    pub lab_id: Option<Option<Uuid>>,
}

pub async fn update_device(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateDeviceRequest>,
) -> Result<StatusCode, ApiError> {
    identity.require_any(&[SUPERUSER])?;
    state
        .device_repo()
        .update(
            id,
            DevicePatch {
                is_authorized: body.is_authorized,
                kind: body.kind,
                lab_id: body.lab_id,
            },
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── DELETE /devices/{id} ─────────────────────────────────────────────────────

pub async fn delete_device(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    identity.require_any(&[SUPERUSER])?;
    if !state.device_repo().delete(id).await? {
        return Err(ApiError::DeviceNotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

// ── GET /devices/{id}/roles ──────────────────────────────────────────────────

#[derive(Serialize)]
pub struct RoleResponse {
    pub id: String,
    pub name: String,
}

pub async fn get_device_roles(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<RoleResponse>>, ApiError> {
    identity.require_any(&[SUPERUSER, STAFF])?;
    let roles = state.device_repo().roles(id).await?;
    Ok(Json(
        roles
            .into_iter()
            .map(|r| RoleResponse {
                id: r.id.to_string(),
                name: r.name,
            })
            .collect(),
    ))
}

// ── POST /devices/{id}/roles ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct AddDeviceRoleRequest {
    pub role_id: Uuid,
}

pub async fn add_device_role(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<AddDeviceRoleRequest>,
) -> Result<StatusCode, ApiError> {
    identity.require_any(&[SUPERUSER])?;
    if state.device_repo().find_by_id(id).await?.is_none() {
        return Err(ApiError::DeviceNotFound);
    }
    state.device_repo().add_role(id, body.role_id).await?;
    Ok(StatusCode::CREATED)
}

// ── DELETE /devices/{id}/roles/{role_id} ─────────────────────────────────────

pub async fn remove_device_role(
    identity: Identity,
    State(state): State<AppState>,
    Path((id, role_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    identity.require_any(&[SUPERUSER])?;
    if !state.device_repo().remove_role(id, role_id).await? {
        return Err(ApiError::RoleNotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

// ── GET /devices/{id}/access-logs ────────────────────────────────────────────

#[derive(Serialize)]
pub struct AccessLogResponse {
    pub id: String,
    pub user_id: String,
    pub username: String,
    pub permission: bool,
    #[serde(serialize_with = "morea_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

pub async fn get_device_access_logs(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Vec<AccessLogResponse>>, ApiError> {
    identity.require_any(&[SUPERUSER, STAFF])?;
    if state.device_repo().find_by_id(id).await?.is_none() {
        return Err(ApiError::DeviceNotFound);
    }
    let entries = state.access_log_repo().list_by_device(id, page).await?;
    Ok(Json(
        entries
            .into_iter()
            .map(|e| AccessLogResponse {
                id: e.log.id.to_string(),
                user_id: e.log.user_id.to_string(),
                username: e.username,
                permission: e.log.permission,
                created_at: e.log.created_at,
            })
            .collect(),
    ))
}
