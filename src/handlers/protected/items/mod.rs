pub mod create;
pub mod delete;
pub mod list;
pub mod show;
pub mod update;

use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

// Re-export handler functions for use in routing
pub use create::item_create;
pub use delete::item_delete;
pub use list::item_list;
pub use show::item_show;
pub use update::item_update;

/// Resolve the caller's local user id, which scopes every item route.
pub(crate) async fn resolve_owner(state: &AppState, auth_user: &AuthUser) -> Result<Uuid, ApiError> {
    match state.users.find_by_subject(&auth_user.subject).await? {
        Some(user) => Ok(user.id),
        None => Err(ApiError::forbidden(
            "User profile has not been synchronized yet",
        )),
    }
}
