use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

use morea_domain::access::{STAFF, SUPERUSER};

use crate::domain::repository::RoleRepository;
use crate::domain::types::Role;
use crate::error::ApiError;
use crate::handlers::device::RoleResponse;
use crate::identity::Identity;
use crate::state::AppState;

// ── GET /roles ───────────────────────────────────────────────────────────────

pub async fn get_roles(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<Vec<RoleResponse>>, ApiError> {
    identity.require_any(&[SUPERUSER, STAFF])?;
    let roles = state.role_repo().list().await?;
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

// ── POST /roles ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateRoleRequest {
    pub name: String,
}

pub async fn create_role(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<CreateRoleRequest>,
) -> Result<(StatusCode, Json<RoleResponse>), ApiError> {
    identity.require_any(&[SUPERUSER])?;
    if body.name.is_empty() {
        return Err(ApiError::MissingData);
    }
    let role = Role {
        id: Uuid::new_v4(),
        name: body.name,
    };
    state.role_repo().create(&role).await?;
    Ok((
        StatusCode::CREATED,
        Json(RoleResponse {
            id: role.id.to_string(),
            name: role.name,
        }),
    ))
}

// ── PATCH /roles/{id} ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateRoleRequest {
    pub name: String,
}

pub async fn update_role(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateRoleRequest>,
) -> Result<StatusCode, ApiError> {
    identity.require_any(&[SUPERUSER])?;
    if body.name.is_empty() {
        return Err(ApiError::MissingData);
    }
    state.role_repo().update(id, &body.name).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── DELETE /roles/{id} ───────────────────────────────────────────────────────

pub async fn delete_role(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    identity.require_any(&[SUPERUSER])?;
    if !state.role_repo().delete(id).await? {
        return Err(ApiError::RoleNotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

// ── POST /users/{id}/roles ───────────────────────────────────────────────────

/// The role may be named by id or by name.
#[derive(Deserialize)]
pub struct AssignRoleRequest {
    pub role_id: Option<Uuid>,
    pub role_name: Option<String>,
}

pub async fn assign_user_role(
    identity: Identity,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<AssignRoleRequest>,
) -> Result<StatusCode, ApiError> {
    identity.require_any(&[SUPERUSER])?;
    let found = match (body.role_id, body.role_name.as_deref()) {
        (Some(id), _) => state.role_repo().find_by_id(id).await?,
        (None, Some(name)) => state.role_repo().find_by_name(name).await?,
        (None, None) => return Err(ApiError::MissingData),
    };
    let Some(role) = found else {
        return Err(ApiError::RoleNotFound);
    };
    state.role_repo().assign_user(user_id, role.id).await?;
    Ok(StatusCode::CREATED)
}

// ── DELETE /users/{id}/roles/{role_id} ───────────────────────────────────────

pub async fn remove_user_role(
    identity: Identity,
    State(state): State<AppState>,
    Path((user_id, role_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    identity.require_any(&[SUPERUSER])?;
    if !state.role_repo().remove_user(user_id, role_id).await? {
        return Err(ApiError::RoleNotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}
