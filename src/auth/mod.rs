use std::sync::Arc;

use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AuthConfig;

pub mod jwks;

pub use jwks::{HttpKeySetSource, JwksCache, JwksError, KeySetSource};

/// Claims we read from provider-issued access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// A single audience string or an array, as issued.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<serde_json::Value>,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingHeader,

    #[error("{0}")]
    MalformedHeader(&'static str),

    #[error("Token header has no key id")]
    MissingKeyId,

    #[error("Invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Keys(#[from] JwksError),
}

/// Verifies bearer tokens against the issuer's published keys.
pub struct TokenValidator {
    keys: Arc<JwksCache>,
    validation: Validation,
}

impl TokenValidator {
    pub fn new(keys: Arc<JwksCache>, config: &AuthConfig) -> Self {
        let algorithms = if config.algorithms.is_empty() {
            vec![Algorithm::RS256]
        } else {
            config.algorithms.clone()
        };

        let mut validation = Validation::new(algorithms[0]);
        validation.algorithms = algorithms;
        validation.leeway = config.leeway_secs;

        if let Some(issuer) = config.issuer() {
            validation.set_issuer(&[issuer.as_str()]);
        }
        match &config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Self { keys, validation }
    }

    pub async fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token)?;
        let kid = header.kid.ok_or(AuthError::MissingKeyId)?;
        let key = self.keys.decoding_key(&kid).await?;

        let data = decode::<Claims>(token, &key, &self.validation)?;
        Ok(data.claims)
    }
}
