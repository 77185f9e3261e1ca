use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::state::AppState;
use crate::sync::MaterializeError;

use super::auth::AuthUser;

/// Makes sure the authenticated caller has a local user record.
///
/// Best effort: a failed sync is logged and the request continues unchanged.
/// Must run after [`super::jwt_auth_middleware`].
pub async fn sync_user_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let auth_user = request.extensions().get::<AuthUser>().cloned();

    match auth_user {
        Some(user) => match state.user_sync.ensure(&user).await {
            Ok(_) => {}
            Err(MaterializeError::Backoff) => {
                tracing::debug!("User sync for '{}' deferred after recent failure", user.subject);
            }
            Err(e) => {
                tracing::warn!("User sync for '{}' failed: {}", user.subject, e);
            }
        },
        None => tracing::warn!("User sync skipped: request is not authenticated"),
    }

    next.run(request).await
}
