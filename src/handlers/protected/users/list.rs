// handlers/protected/users/list.rs - GET /api/users handler

use axum::extract::{Query, State};

use crate::domain::User;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::types::Pagination;

pub async fn user_list(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Vec<User>> {
    let page = pagination.page(state.config.api.max_page_size);
    let users = state.users.list(page).await?;
    Ok(ApiResponse::success(users))
}
