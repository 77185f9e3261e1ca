use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::{AuthError, Claims};
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated caller, as asserted by the identity provider's token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub subject: String,
    pub email: Option<String>,
    pub name: Option<String>,
    /// The raw bearer token, for calls made on the caller's behalf.
    pub token: String,
}

impl AuthUser {
    pub fn from_claims(claims: Claims, token: &str) -> Self {
        Self {
            subject: claims.sub,
            email: claims.email,
            name: claims.name,
            token: token.to_string(),
        }
    }
}

/// JWT authentication middleware that validates tokens and extracts user context
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(request.headers())?;

    let claims = state.validator.validate(token).await.map_err(|e| {
        tracing::debug!("Rejected bearer token: {}", e);
        ApiError::from(e)
    })?;

    // Convert claims to AuthUser and inject into request
    let auth_user = AuthUser::from_claims(claims, token);
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AuthError::MalformedHeader("Invalid Authorization header format"))?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        Some(_) => Err(AuthError::MalformedHeader("Empty JWT token")),
        None => Err(AuthError::MalformedHeader(
            "Authorization header must use Bearer token format",
        )),
    }
}
