use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::identity::Identity;
use crate::state::AppState;
use crate::usecase::metering::{
    ChartData, ChartDataUseCase, Measurement, StoreReadingsInput, StoreReadingsUseCase,
};

// ── POST /store-data ─────────────────────────────────────────────────────────

/// Field names are fixed by deployed meter firmware, which also sends a
/// `macAddress` field; the token alone identifies the device.
#[derive(Deserialize)]
pub struct StoreDataRequest {
    #[serde(rename = "apiToken")]
    pub api_token: String,
    #[serde(rename = "measure")]
    pub measurements: Vec<Measurement>,
}

pub async fn store_data(
    State(state): State<AppState>,
    Json(body): Json<StoreDataRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let usecase = StoreReadingsUseCase {
        devices: state.device_repo(),
        readings: state.meter_reading_repo(),
    };
    usecase
        .execute(StoreReadingsInput {
            api_token: body.api_token,
            measurements: body.measurements,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "message": "data stored." })),
    ))
}

// ── GET /metering/{device_id}/chart ──────────────────────────────────────────

pub async fn get_chart_data(
    _identity: Identity,
    State(state): State<AppState>,
    Path(device_id): Path<Uuid>,
) -> Result<Json<ChartData>, ApiError> {
    let usecase = ChartDataUseCase {
        devices: state.device_repo(),
        readings: state.meter_reading_repo(),
    };
    let chart = usecase.execute(device_id).await?;
    Ok(Json(chart))
}
