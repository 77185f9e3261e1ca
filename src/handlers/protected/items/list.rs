// handlers/protected/items/list.rs - GET /api/items handler

use axum::{
    extract::{Query, State},
    Extension,
};

use crate::domain::Item;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;
use crate::types::Pagination;

use super::resolve_owner;

/// GET /api/items - the caller's items, newest first
pub async fn item_list(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Vec<Item>> {
    let owner_id = resolve_owner(&state, &auth_user).await?;
    let page = pagination.page(state.config.api.max_page_size);

    let items = state.items.list(owner_id, page).await?;
    Ok(ApiResponse::success(items))
}
