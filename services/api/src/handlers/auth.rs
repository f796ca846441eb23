//! Dashboard session endpoints.

use axum::{Json, extract::State, http::StatusCode};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use morea_auth::cookie::{clear_session_cookie, set_session_cookie};

use crate::error::ApiError;
use crate::identity::Identity;
use crate::state::AppState;
use crate::usecase::session::{LoginInput, LoginUseCase};

// ── POST /auth/login ─────────────────────────────────────────────────────────

/// Either `email` or `username` identifies the account.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: String,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub id: String,
    pub username: String,
    pub roles: Vec<String>,
}

/// The token travels both ways: as an HTTP-only cookie for the browser and
/// in the body for non-browser clients.
#[derive(Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: SessionResponse,
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    if body.password.is_empty() {
        return Err(ApiError::MissingData);
    }
    let usecase = LoginUseCase {
        users: state.user_repo(),
        jwt_secret: state.jwt_secret.clone(),
    };
    let out = usecase
        .execute(LoginInput {
            email: body.email,
            username: body.username,
            password: body.password,
        })
        .await?;
    let jar = set_session_cookie(jar, out.token.clone());
    Ok((
        jar,
        Json(LoginResponse {
            access_token: out.token,
            user: SessionResponse {
                id: out.user.id.to_string(),
                username: out.user.username,
                roles: out.roles,
            },
        }),
    ))
}

// ── POST /auth/logout ────────────────────────────────────────────────────────

pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    (clear_session_cookie(jar), StatusCode::NO_CONTENT)
}

// ── GET /auth/session ────────────────────────────────────────────────────────

pub async fn get_session(identity: Identity) -> Json<SessionResponse> {
    Json(SessionResponse {
        id: identity.user_id.to_string(),
        username: identity.username,
        roles: identity.roles,
    })
}
