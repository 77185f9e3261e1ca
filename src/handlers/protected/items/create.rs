// handlers/protected/items/create.rs - POST /api/items handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};

use crate::domain::{Item, ItemInput};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

use super::resolve_owner;

/// POST /api/items - create an item owned by the caller
///
/// Expected Input:
/// ```json
/// { "name": "Groceries", "description": "Milk, eggs" }
/// ```
pub async fn item_create(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    payload: Result<Json<ItemInput>, JsonRejection>,
) -> ApiResult<Item> {
    let owner_id = resolve_owner(&state, &auth_user).await?;
    let Json(input) = payload?;
    let fields = input.validate()?;

    let item = state.items.create(owner_id, fields).await?;
    Ok(ApiResponse::created(item))
}
