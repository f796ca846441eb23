use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use morea_domain::access::{STAFF, SUPERUSER};
use morea_domain::pagination::PageRequest;

use crate::domain::repository::LabRepository;
use crate::domain::types::Lab;
use crate::error::ApiError;
use crate::handlers::device::AccessLogResponse;
use crate::identity::Identity;
use crate::state::AppState;
use crate::usecase::audit::LabAccessLogsUseCase;
use crate::usecase::unlock::{UnlockLabInput, UnlockLabUseCase};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct LabResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(serialize_with = "morea_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Lab> for LabResponse {
    fn from(lab: Lab) -> Self {
        Self {
            id: lab.id.to_string(),
            name: lab.name,
            description: lab.description,
            created_at: lab.created_at,
        }
    }
}

// ── GET /labs ────────────────────────────────────────────────────────────────

pub async fn get_labs(
    _identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<Vec<LabResponse>>, ApiError> {
    let labs = state.lab_repo().list().await?;
    Ok(Json(labs.into_iter().map(LabResponse::from).collect()))
}

// ── POST /labs ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateLabRequest {
    pub name: String,
    pub description: Option<String>,
}

pub async fn create_lab(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<CreateLabRequest>,
) -> Result<(StatusCode, Json<LabResponse>), ApiError> {
    identity.require_any(&[SUPERUSER])?;
    if body.name.is_empty() {
        return Err(ApiError::MissingData);
    }
    let lab = Lab {
        id: Uuid::new_v4(),
        name: body.name,
        description: body.description,
        created_at: Utc::now(),
    };
    state.lab_repo().create(&lab).await?;
    Ok((StatusCode::CREATED, Json(lab.into())))
}

// ── GET /labs/{id} ───────────────────────────────────────────────────────────

pub async fn get_lab(
    _identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LabResponse>, ApiError> {
    let lab = state
        .lab_repo()
        .find_by_id(id)
        .await?
        .ok_or(ApiError::LabNotFound)?;
    Ok(Json(lab.into()))
}

// ── PATCH /labs/{id} ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateLabRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

pub async fn update_lab(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateLabRequest>,
) -> Result<StatusCode, ApiError> {
    identity.require_any(&[SUPERUSER])?;
    state
        .lab_repo()
        .update(id, body.name.as_deref(), body.description.as_deref())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── DELETE /labs/{id} ────────────────────────────────────────────────────────

pub async fn delete_lab(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    identity.require_any(&[SUPERUSER])?;
    if !state.lab_repo().delete(id).await? {
        return Err(ApiError::LabNotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

// ── POST /labs/unlock/{lab_id} ───────────────────────────────────────────────

#[derive(Serialize)]
pub struct UnlockResponse {
    pub message: &'static str,
    pub access: bool,
}

pub async fn unlock_lab(
    identity: Identity,
    State(state): State<AppState>,
    Path(lab_id): Path<Uuid>,
) -> Result<Json<UnlockResponse>, ApiError> {
    let usecase = UnlockLabUseCase {
        users: state.user_repo(),
        labs: state.lab_repo(),
        reservations: state.reservation_repo(),
        access_logs: state.access_log_repo(),
        unlock: state.unlock_client(),
    };
    usecase
        .execute(UnlockLabInput {
            user_id: identity.user_id,
            lab_id,
        })
        .await?;
    Ok(Json(UnlockResponse {
        message: "lab unlocked.",
        access: true,
    }))
}

// ── GET /labs/{id}/access-logs ───────────────────────────────────────────────

pub async fn get_lab_access_logs(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Vec<AccessLogResponse>>, ApiError> {
    identity.require_any(&[SUPERUSER, STAFF])?;
    let usecase = LabAccessLogsUseCase {
        labs: state.lab_repo(),
        access_logs: state.access_log_repo(),
    };
    let entries = usecase.execute(id, page).await?;
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

// ── POST /labs/{id}/members ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LabMemberRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub is_staff: bool,
}

#[derive(Deserialize)]
pub struct AddLabMembersRequest {
    pub members: Vec<LabMemberRequest>,
}

pub async fn add_lab_members(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<AddLabMembersRequest>,
) -> Result<StatusCode, ApiError> {
    // Superuser anywhere; lab staff only in their own lab.
    if !identity.is_superuser() {
        let member = state.lab_repo().find_member(identity.user_id, id).await?;
        if !member.is_some_and(|m| m.is_staff) {
            return Err(ApiError::Forbidden);
        }
    }
    if state.lab_repo().find_by_id(id).await?.is_none() {
        return Err(ApiError::LabNotFound);
    }
    let members: Vec<(Uuid, bool)> = body
        .members
        .iter()
        .map(|m| (m.user_id, m.is_staff))
        .collect();
    state.lab_repo().add_members(id, &members).await?;
    Ok(StatusCode::CREATED)
}

// ── DELETE /labs/{id}/members/{user_id} ──────────────────────────────────────

pub async fn remove_lab_member(
    identity: Identity,
    State(state): State<AppState>,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    if !identity.is_superuser() {
        let member = state.lab_repo().find_member(identity.user_id, id).await?;
        if !member.is_some_and(|m| m.is_staff) {
            return Err(ApiError::Forbidden);
        }
    }
    if state.lab_repo().remove_members(user_id, &[id]).await? == 0 {
        return Err(ApiError::UserNotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}
