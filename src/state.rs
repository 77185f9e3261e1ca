use std::sync::Arc;

use anyhow::Context;
use sqlx::PgPool;

use crate::auth::{HttpKeySetSource, JwksCache, KeySetSource, TokenValidator};
use crate::config::AppConfig;
use crate::database::{
    EventDispatcher, ItemRepository, ItemStore, LoggingDispatcher, UserDirectory, UserRepository,
};
use crate::services::{ItemService, UserSync};

/// Shared application state handed to every handler and middleware.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pool: PgPool,
    pub validator: Arc<TokenValidator>,
    pub users: Arc<dyn UserDirectory>,
    pub items: Arc<ItemService>,
    pub user_sync: Arc<UserSync>,
}

impl AppState {
    /// Wire the state from explicit collaborators.
    pub fn new(
        config: Arc<AppConfig>,
        pool: PgPool,
        keys: Arc<dyn KeySetSource>,
        users: Arc<dyn UserDirectory>,
        items: Arc<dyn ItemStore>,
        dispatcher: Arc<dyn EventDispatcher>,
    ) -> Self {
        let jwks = JwksCache::new(
            keys,
            config.auth.refresh_interval(),
            config.auth.retry_interval(),
        );
        let validator = TokenValidator::new(Arc::new(jwks), &config.auth);
        let user_sync = UserSync::new(Arc::clone(&users), Arc::clone(&dispatcher), &config.user_sync);
        let items = ItemService::new(items, dispatcher);

        Self {
            config,
            pool,
            validator: Arc::new(validator),
            users,
            items: Arc::new(items),
            user_sync: Arc::new(user_sync),
        }
    }

    /// Production wiring: Postgres repositories and the provider's JWKS endpoint.
    pub fn from_config(config: Arc<AppConfig>, pool: PgPool) -> anyhow::Result<Self> {
        let endpoint = config
            .auth
            .jwks_endpoint()
            .context("AUTH_AUTHORITY or AUTH_JWKS_URL must be a valid URL")?;
        tracing::info!("Verifying tokens against keys at {}", endpoint);

        let keys = HttpKeySetSource::new(endpoint, config.auth.fetch_timeout())
            .context("failed to build JWKS HTTP client")?;

        Ok(Self::new(
            config,
            pool.clone(),
            Arc::new(keys),
            Arc::new(UserRepository::new(pool.clone())),
            Arc::new(ItemRepository::new(pool)),
            Arc::new(LoggingDispatcher),
        ))
    }
}
