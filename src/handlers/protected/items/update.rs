// handlers/protected/items/update.rs - PUT /api/items/:id handler

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use uuid::Uuid;

use crate::domain::{Item, ItemInput};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

use super::resolve_owner;

/// PUT /api/items/:id - replace name and description
pub async fn item_update(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    payload: Result<Json<ItemInput>, JsonRejection>,
) -> ApiResult<Item> {
    let owner_id = resolve_owner(&state, &auth_user).await?;
    let Json(input) = payload?;
    let fields = input.validate()?;

    let item = state.items.update(owner_id, id, fields).await?;
    Ok(ApiResponse::success(item))
}
