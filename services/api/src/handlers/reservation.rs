use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use morea_domain::access::{STAFF, SUPERUSER};

use crate::domain::repository::ReservationRepository;
use crate::domain::types::Reservation;
use crate::error::ApiError;
use crate::identity::Identity;
use crate::state::AppState;
use crate::usecase::reservation::{CreateReservationInput, CreateReservationUseCase};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ReservationResponse {
    pub id: String,
    pub user_id: String,
    pub lab_id: String,
    #[serde(serialize_with = "morea_core::serde::to_rfc3339_ms")]
    pub start_time: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "morea_core::serde::to_rfc3339_ms")]
    pub end_time: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "morea_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Reservation> for ReservationResponse {
    fn from(r: Reservation) -> Self {
        Self {
            id: r.id.to_string(),
            user_id: r.user_id.to_string(),
            lab_id: r.lab_id.to_string(),
            start_time: r.start_time,
            end_time: r.end_time,
            created_at: r.created_at,
        }
    }
}

// ── GET /reservations ────────────────────────────────────────────────────────

pub async fn get_reservations(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<Vec<ReservationResponse>>, ApiError> {
    identity.require_any(&[SUPERUSER, STAFF])?;
    let reservations = state.reservation_repo().list().await?;
    Ok(Json(reservations.into_iter().map(Into::into).collect()))
}

// ── GET /reservations/@me ────────────────────────────────────────────────────

pub async fn get_my_reservations(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<Vec<ReservationResponse>>, ApiError> {
    let reservations = state
        .reservation_repo()
        .list_by_user(identity.user_id)
        .await?;
    Ok(Json(reservations.into_iter().map(Into::into).collect()))
}

// ── POST /reservations ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateReservationRequest {
    pub lab_id: Uuid,
    /// Superusers may book on behalf of another user.
    pub user_id: Option<Uuid>,
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub end_time: chrono::DateTime<chrono::Utc>,
}

pub async fn create_reservation(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<CreateReservationRequest>,
) -> Result<(StatusCode, Json<ReservationResponse>), ApiError> {
    let user_id = match body.user_id {
        Some(other) if other != identity.user_id => {
            identity.require_any(&[SUPERUSER])?;
            other
        }
        _ => identity.user_id,
    };
    let usecase = CreateReservationUseCase {
        reservations: state.reservation_repo(),
        labs: state.lab_repo(),
    };
    let reservation = usecase
        .execute(CreateReservationInput {
            user_id,
            lab_id: body.lab_id,
            start_time: body.start_time,
            end_time: body.end_time,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(reservation.into())))
}

// ── DELETE /reservations/{id} ────────────────────────────────────────────────

pub async fn delete_reservation(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    // Owners cancel their own bookings; superusers cancel any.
    let mine = state
        .reservation_repo()
        .list_by_user(identity.user_id)
        .await?;
    if !mine.iter().any(|r| r.id == id) {
        identity.require_any(&[SUPERUSER])?;
    }
    if !state.reservation_repo().delete(id).await? {
        return Err(ApiError::ReservationNotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}
