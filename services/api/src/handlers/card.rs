use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use morea_domain::access::{STAFF, SUPERUSER};

use crate::domain::repository::CardRepository;
use crate::domain::types::Card;
use crate::error::ApiError;
use crate::handlers::user::CardResponse;
use crate::identity::Identity;
use crate::state::AppState;
use crate::usecase::card::{LinkCardInput, LinkCardUseCase, UnlinkCardUseCase};

// ── GET /cards ───────────────────────────────────────────────────────────────

pub async fn get_cards(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<Vec<CardResponse>>, ApiError> {
    identity.require_any(&[SUPERUSER, STAFF])?;
    let cards = state.card_repo().list().await?;
    Ok(Json(cards.into_iter().map(CardResponse::from).collect()))
}

// ── POST /cards ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateCardRequest {
    pub card_id: String,
    #[serde(default)]
    pub permission: bool,
    pub name: Option<String>,
}

pub async fn create_card(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<CreateCardRequest>,
) -> Result<(StatusCode, Json<CardResponse>), ApiError> {
    identity.require_any(&[SUPERUSER])?;
    if body.card_id.is_empty() {
        return Err(ApiError::MissingData);
    }
    let card = Card {
        id: Uuid::new_v4(),
        card_id: body.card_id,
        permission: body.permission,
        name: body.name,
        created_at: Utc::now(),
    };
    state.card_repo().create(&card).await?;
    Ok((StatusCode::CREATED, Json(card.into())))
}

// ── PATCH /cards/{id} ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateCardRequest {
    pub permission: Option<bool>,
    pub name: Option<String>,
}

pub async fn update_card(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateCardRequest>,
) -> Result<StatusCode, ApiError> {
    identity.require_any(&[SUPERUSER])?;
    state
        .card_repo()
        .update(id, body.permission, body.name.as_deref())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── DELETE /cards/{id} ───────────────────────────────────────────────────────

pub async fn delete_card(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    identity.require_any(&[SUPERUSER])?;
    if !state.card_repo().delete(id).await? {
        return Err(ApiError::CardNotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

// ── POST /cards/link ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LinkCardRequest {
    pub user_id: Uuid,
    pub card_id: String,
}

pub async fn link_card(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<LinkCardRequest>,
) -> Result<StatusCode, ApiError> {
    identity.require_any(&[SUPERUSER, STAFF])?;
    let usecase = LinkCardUseCase {
        cards: state.card_repo(),
        users: state.user_repo(),
    };
    usecase
        .execute(LinkCardInput {
            user_id: body.user_id,
            card_hex: body.card_id,
        })
        .await?;
    Ok(StatusCode::CREATED)
}

// ── DELETE /users/{user_id}/cards/{card_id} ──────────────────────────────────

pub async fn unlink_card(
    identity: Identity,
    State(state): State<AppState>,
    Path((user_id, card_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    identity.require_any(&[SUPERUSER, STAFF])?;
    let usecase = UnlinkCardUseCase {
        cards: state.card_repo(),
    };
    usecase.execute(user_id, card_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
