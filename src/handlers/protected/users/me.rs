// handlers/protected/users/me.rs - GET /api/users/me handler

use axum::{extract::State, Extension};
use serde::Serialize;

use crate::domain::User;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// The caller as seen by this service.
///
/// `synced` is false while the local record has not been materialized yet,
/// in which case only the token's claims are returned.
#[derive(Debug, Serialize)]
pub struct CurrentUser {
    pub synced: bool,
    pub subject: String,
    pub email: Option<String>,
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

/// GET /api/users/me - current caller's local profile
pub async fn user_me(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<CurrentUser> {
    let user = match state.users.find_by_subject(&auth_user.subject).await {
        Ok(user) => user,
        // Degrade to the claims view rather than failing the request
        Err(e) if e.is_unavailable() => {
            tracing::warn!("Could not load user '{}': {}", auth_user.subject, e);
            None
        }
        Err(e) => return Err(ApiError::from(e)),
    };

    Ok(ApiResponse::success(CurrentUser {
        synced: user.is_some(),
        subject: auth_user.subject,
        email: auth_user.email,
        name: auth_user.name,
        user,
    }))
}
