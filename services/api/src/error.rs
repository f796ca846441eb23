use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// API error variants, mapped onto the HTTP taxonomy the dashboard and the
/// door controllers expect.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("user not found")]
    UserNotFound,
    #[error("card not found")]
    CardNotFound,
    #[error("device not found")]
    DeviceNotFound,
    #[error("lab not found")]
    LabNotFound,
    #[error("role not found")]
    RoleNotFound,
    #[error("reservation not found")]
    ReservationNotFound,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid token")]
    InvalidToken,
    #[error("invalid api token")]
    InvalidApiToken,
    #[error("device not authorized")]
    DeviceNotAuthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("email already in use")]
    EmailAlreadyExists,
    #[error("card already registered")]
    CardAlreadyExists,
    #[error("card already linked to this user")]
    CardAlreadyLinked,
    #[error("role already exists")]
    RoleAlreadyExists,
    #[error("lab slot already reserved")]
    ReservationConflict,
    #[error("missing data")]
    MissingData,
    #[error("invalid pin")]
    InvalidPin,
    #[error("end time must be after start time")]
    InvalidTimeRange,
    #[error("no measurements received")]
    EmptyMeasurements,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::CardNotFound => "CARD_NOT_FOUND",
            Self::DeviceNotFound => "DEVICE_NOT_FOUND",
            Self::LabNotFound => "LAB_NOT_FOUND",
            Self::RoleNotFound => "ROLE_NOT_FOUND",
            Self::ReservationNotFound => "RESERVATION_NOT_FOUND",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::InvalidApiToken => "INVALID_API_TOKEN",
            Self::DeviceNotAuthorized => "DEVICE_NOT_AUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            Self::CardAlreadyExists => "CARD_ALREADY_EXISTS",
            Self::CardAlreadyLinked => "CARD_ALREADY_LINKED",
            Self::RoleAlreadyExists => "ROLE_ALREADY_EXISTS",
            Self::ReservationConflict => "RESERVATION_CONFLICT",
            Self::MissingData => "MISSING_DATA",
            Self::InvalidPin => "INVALID_PIN",
            Self::InvalidTimeRange => "INVALID_TIME_RANGE",
            Self::EmptyMeasurements => "EMPTY_MEASUREMENTS",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::UserNotFound
            | Self::CardNotFound
            | Self::DeviceNotFound
            | Self::LabNotFound
            | Self::RoleNotFound
            | Self::ReservationNotFound => StatusCode::NOT_FOUND,
            Self::InvalidCredentials
            | Self::InvalidToken
            | Self::InvalidApiToken
            | Self::DeviceNotAuthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::EmailAlreadyExists
            | Self::CardAlreadyExists
            | Self::CardAlreadyLinked
            | Self::RoleAlreadyExists
            | Self::ReservationConflict => StatusCode::CONFLICT,
            Self::MissingData
            | Self::InvalidPin
            | Self::InvalidTimeRange
            | Self::EmptyMeasurements => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Log 500s only — tower-http TraceLayer already records method/uri/status
        // for every request. 4xx are expected client errors.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
