// handlers/protected/users/show.rs - GET /api/users/:id handler

use axum::extract::{Path, State};
use uuid::Uuid;

use crate::domain::User;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

pub async fn user_show(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<User> {
    let user = state
        .users
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User {} not found", id)))?;

    Ok(ApiResponse::success(user))
}
