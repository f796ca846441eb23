//! Session-cookie identity extractor.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;

use morea_auth::cookie::MOREA_SESSION_TOKEN;
use morea_auth::token::validate_session_token;
use morea_domain::access::is_superuser;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated caller, extracted from the `morea_access_token` cookie.
///
/// Rejects with 401 when the cookie is absent, expired, or tampered with.
/// Role enforcement (403) is done by handlers after extraction.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub username: String,
    pub roles: Vec<String>,
}

impl Identity {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_superuser(&self) -> bool {
        is_superuser(&self.roles)
    }

    /// 403 unless the caller holds at least one of `roles`.
    pub fn require_any(&self, roles: &[&str]) -> Result<(), ApiError> {
        if roles.iter().any(|r| self.has_role(r)) {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }
}

impl FromRequestParts<AppState> for Identity {
    type Rejection = ApiError;

    // axum-core 0.5 defines this as `fn -> impl Future + Send` (not `async fn`).
    // Extract values synchronously, return a 'static async move block.
    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let jar = CookieJar::from_headers(&parts.headers);
        let token_value = jar.get(MOREA_SESSION_TOKEN).map(|c| c.value().to_owned());
        let secret = state.jwt_secret.clone();

        async move {
            let token_value = token_value.ok_or(ApiError::InvalidToken)?;
            let info = validate_session_token(&token_value, &secret)
                .map_err(|_| ApiError::InvalidToken)?;
            Ok(Self {
                user_id: info.user_id,
                username: info.username,
                roles: info.roles,
            })
        }
    }
}
