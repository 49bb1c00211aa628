use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::auth::Actor;
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::services::UserDirectory;

/// Header carrying the caller's verified email, set by the gateway in
/// front of this service
pub const USER_EMAIL_HEADER: &str = "x-user-email";

// Authentication happened upstream; here we only turn the forwarded email
// into a directory-backed Actor. No header, or an email the directory does
// not know, is a 401.
#[axum::async_trait]
impl FromRequestParts<AppState> for Actor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let email = parts
            .headers
            .get(USER_EMAIL_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ApiError::Unauthorized("missing X-User-Email header".to_string()))?;

        let user = UserDirectory::new(state.db.clone())
            .find_by_email(email)
            .await?
            .ok_or_else(|| ApiError::Unauthorized(format!("no account for {}", email)))?;

        Ok(Actor::from_user(user)?)
    }
}
