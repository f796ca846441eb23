//! Door-controller authorization endpoints.
//!
//! These respond with the legacy plain-text wire format, not JSON; deployed
//! ESP32 firmware parses `"Authorized?first_name=<username>"` byte for byte.

use axum::{Json, extract::State};
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::access::{
    ValidateCardInput, ValidateCardUseCase, ValidatePinInput, ValidatePinUseCase,
};

// ── POST /approximations/auth ────────────────────────────────────────────────

/// Field names are fixed by deployed controller firmware.
#[derive(Deserialize)]
pub struct CardAuthRequest {
    #[serde(rename = "hexid")]
    pub card_id: String,
    #[serde(rename = "macaddress")]
    pub mac_address: String,
}

pub async fn validate_card(
    State(state): State<AppState>,
    Json(body): Json<CardAuthRequest>,
) -> Result<String, ApiError> {
    if body.card_id.is_empty() || body.mac_address.is_empty() {
        return Err(ApiError::MissingData);
    }
    let usecase = ValidateCardUseCase {
        cards: state.card_repo(),
        devices: state.device_repo(),
        access_logs: state.access_log_repo(),
    };
    let decision = usecase
        .execute(ValidateCardInput {
            card_hex: body.card_id,
            mac_address: body.mac_address,
        })
        .await?;
    Ok(decision.to_legacy_string())
}

// ── POST /devices/auth/pin ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct PinAuthRequest {
    pub pin: String,
    #[serde(rename = "macAddress")]
    pub mac_address: String,
}

pub async fn validate_pin(
    State(state): State<AppState>,
    Json(body): Json<PinAuthRequest>,
) -> Result<String, ApiError> {
    if body.pin.is_empty() || body.mac_address.is_empty() {
        return Err(ApiError::MissingData);
    }
    let usecase = ValidatePinUseCase {
        devices: state.device_repo(),
        users: state.user_repo(),
        reservations: state.reservation_repo(),
        access_logs: state.access_log_repo(),
    };
    let decision = usecase
        .execute(ValidatePinInput {
            pin: body.pin,
            mac_address: body.mac_address,
        })
        .await?;
    Ok(decision.to_legacy_string())
}
