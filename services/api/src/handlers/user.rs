use anyhow::Context as _;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use morea_domain::access::{STAFF, SUPERUSER};

use crate::domain::repository::{
    CardRepository, LabRepository, ReservationRepository, UserPatch, UserRepository,
};
use crate::domain::types::{User, validate_pin};
use crate::error::ApiError;
use crate::identity::Identity;
use crate::state::AppState;
use crate::usecase::session::{SignupInput, SignupUseCase};

// ── Response types ───────────────────────────────────────────────────────────

/// Never carries the password hash.
#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    pub has_pin: bool,
    #[serde(serialize_with = "morea_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "morea_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username,
            email: user.email,
            is_active: user.is_active,
            has_pin: user.access_pin.is_some(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

// ── GET /users ───────────────────────────────────────────────────────────────

pub async fn get_users(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    identity.require_any(&[SUPERUSER, STAFF])?;
    let users = state.user_repo().list().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

// ── POST /users ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub access_pin: Option<String>,
    #[serde(default)]
    pub lab_ids: Vec<Uuid>,
}

pub async fn create_user(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let usecase = SignupUseCase {
        users: state.user_repo(),
        labs: state.lab_repo(),
    };
    let user = usecase
        .execute(SignupInput {
            actor_id: identity.user_id,
            actor_roles: identity.roles,
            username: body.username,
            email: body.email,
            password: body.password,
            access_pin: body.access_pin,
            lab_ids: body.lab_ids,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

// ── GET /users/@me ───────────────────────────────────────────────────────────

pub async fn get_me(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .user_repo()
        .find_by_id(identity.user_id)
        .await?
        .ok_or(ApiError::UserNotFound)?;
    Ok(Json(user.into()))
}

// ── GET /users/{id} ──────────────────────────────────────────────────────────

pub async fn get_user(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, ApiError> {
    if identity.user_id != id {
        identity.require_any(&[SUPERUSER, STAFF])?;
    }
    let user = state
        .user_repo()
        .find_by_id(id)
        .await?
        .ok_or(ApiError::UserNotFound)?;
    Ok(Json(user.into()))
}

// ── PATCH /users/{id} ────────────────────────────────────────────────────────

/// Distinguishes an absent field (skip) from an explicit `null` (clear).
pub fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(de).map(Some)
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub is_active: Option<bool>,
    /// `null` clears the PIN; absent leaves it untouched.
    #[serde(default, deserialize_with = "double_option")]
    pub access_pin: Option<Option<String>>,
}

pub async fn update_user(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<StatusCode, ApiError> {
    // Users may edit themselves; only superusers may toggle is_active.
    if identity.user_id != id || body.is_active.is_some() {
        identity.require_any(&[SUPERUSER])?;
    }
    if let Some(Some(ref pin)) = body.access_pin {
        if !validate_pin(pin) {
            return Err(ApiError::InvalidPin);
        }
    }
    let password_hash = match body.password {
        Some(password) => {
            Some(bcrypt::hash(&password, bcrypt::DEFAULT_COST).context("bcrypt hash failed")?)
        }
        None => None,
    };
    state
        .user_repo()
        .update(
            id,
            UserPatch {
                username: body.username,
                email: body.email,
                password_hash,
                is_active: body.is_active,
                access_pin: body.access_pin,
            },
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── DELETE /users/{id} ───────────────────────────────────────────────────────

pub async fn delete_user(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    identity.require_any(&[SUPERUSER])?;
    if !state.user_repo().delete(id).await? {
        return Err(ApiError::UserNotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

// ── GET /users/{id}/cards ────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct CardResponse {
    pub id: String,
    pub card_id: String,
    pub permission: bool,
    pub name: Option<String>,
    #[serde(serialize_with = "morea_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<crate::domain::types::Card> for CardResponse {
    fn from(card: crate::domain::types::Card) -> Self {
        Self {
            id: card.id.to_string(),
            card_id: card.card_id,
            permission: card.permission,
            name: card.name,
            created_at: card.created_at,
        }
    }
}

pub async fn get_user_cards(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<CardResponse>>, ApiError> {
    if identity.user_id != id {
        identity.require_any(&[SUPERUSER, STAFF])?;
    }
    let cards = state.card_repo().list_for_user(id).await?;
    Ok(Json(cards.into_iter().map(CardResponse::from).collect()))
}

// ── GET /users/{id}/labs ─────────────────────────────────────────────────────

pub async fn get_user_labs(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<crate::handlers::lab::LabResponse>>, ApiError> {
    if identity.user_id != id {
        identity.require_any(&[SUPERUSER, STAFF])?;
    }
    let labs = state.lab_repo().list_for_user(id).await?;
    Ok(Json(labs.into_iter().map(Into::into).collect()))
}

// ── GET /users/{id}/reservations ─────────────────────────────────────────────

pub async fn get_user_reservations(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<crate::handlers::reservation::ReservationResponse>>, ApiError> {
    if identity.user_id != id {
        identity.require_any(&[SUPERUSER, STAFF])?;
    }
    let reservations = state.reservation_repo().list_by_user(id).await?;
    Ok(Json(reservations.into_iter().map(Into::into).collect()))
}
