// handlers/protected/items/show.rs - GET /api/items/:id handler

use axum::{
    extract::{Path, State},
    Extension,
};
use uuid::Uuid;

use crate::domain::Item;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

use super::resolve_owner;

pub async fn item_show(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Item> {
    let owner_id = resolve_owner(&state, &auth_user).await?;
    let item = state.items.get(owner_id, id).await?;
    Ok(ApiResponse::success(item))
}
