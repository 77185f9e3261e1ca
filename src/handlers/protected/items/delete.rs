// handlers/protected/items/delete.rs - DELETE /api/items/:id handler

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

use super::resolve_owner;

pub async fn item_delete(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let owner_id = resolve_owner(&state, &auth_user).await?;
    state.items.delete(owner_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
