pub mod auth;
pub mod response;
pub mod sync_user;

pub use auth::{jwt_auth_middleware, AuthUser};
pub use response::{ApiResponse, ApiResult};
pub use sync_user::sync_user_middleware;
