use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::DecodingKey;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use url::Url;

#[derive(Debug, Error)]
pub enum JwksError {
    #[error("Failed to fetch signing keys: {0}")]
    Fetch(String),

    #[error("Unknown signing key id '{0}'")]
    UnknownKey(String),

    #[error("Unusable signing key '{kid}': {reason}")]
    InvalidKey { kid: String, reason: String },
}

/// Upstream publisher of the verification key set.
#[async_trait]
pub trait KeySetSource: Send + Sync {
    async fn fetch(&self) -> Result<JwkSet, JwksError>;
}

/// Fetches the identity provider's JWKS document over HTTP.
pub struct HttpKeySetSource {
    client: reqwest::Client,
    url: Url,
}

impl HttpKeySetSource {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, JwksError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| JwksError::Fetch(e.to_string()))?;

        Ok(Self { client, url })
    }
}

#[async_trait]
impl KeySetSource for HttpKeySetSource {
    async fn fetch(&self) -> Result<JwkSet, JwksError> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| JwksError::Fetch(e.to_string()))?;

        let keys: JwkSet = response
            .json()
            .await
            .map_err(|e| JwksError::Fetch(format!("invalid JWKS document: {}", e)))?;

        tracing::debug!("Fetched {} signing keys from {}", keys.keys.len(), self.url);
        Ok(keys)
    }
}

struct CachedKeys {
    keys: Arc<JwkSet>,
    /// Last upstream fetch, successful or not.
    last_attempt_at: Instant,
    next_refresh_at: Instant,
}

/// Last-known-good copy of the issuer's key set.
///
/// Reads are served from the cached set until it is due for refresh. Refreshes
/// go through a single mutex, so a burst of callers on an expired set causes
/// one upstream fetch. A failed refresh keeps serving the previous set; only a
/// cold cache surfaces the error.
pub struct JwksCache {
    source: Arc<dyn KeySetSource>,
    cached: RwLock<Option<CachedKeys>>,
    refresh: Mutex<()>,
    refresh_interval: Duration,
    retry_interval: Duration,
}

impl JwksCache {
    pub fn new(
        source: Arc<dyn KeySetSource>,
        refresh_interval: Duration,
        retry_interval: Duration,
    ) -> Self {
        Self {
            source,
            cached: RwLock::new(None),
            refresh: Mutex::new(()),
            refresh_interval,
            retry_interval,
        }
    }

    /// Current verification keys, refreshing them if they are due.
    pub async fn current_keys(&self) -> Result<Arc<JwkSet>, JwksError> {
        if let Some(keys) = self.fresh_keys().await {
            return Ok(keys);
        }

        let _refresh = self.refresh.lock().await;
        if let Some(keys) = self.fresh_keys().await {
            return Ok(keys);
        }

        self.refresh_locked().await
    }

    /// Resolve the key a token was signed with.
    ///
    /// A `kid` missing from the cached set triggers one refresh, since the
    /// issuer may have rotated keys since the last fetch.
    pub async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, JwksError> {
        let keys = self.current_keys().await?;
        if let Some(jwk) = keys.find(kid) {
            return key_from_jwk(kid, jwk);
        }

        tracing::debug!("Signing key '{}' not in cached set, refreshing", kid);
        let keys = self.refresh_for_rotation().await?;
        match keys.find(kid) {
            Some(jwk) => key_from_jwk(kid, jwk),
            None => Err(JwksError::UnknownKey(kid.to_string())),
        }
    }

    async fn fresh_keys(&self) -> Option<Arc<JwkSet>> {
        let cached = self.cached.read().await;
        cached
            .as_ref()
            .filter(|c| Instant::now() < c.next_refresh_at)
            .map(|c| Arc::clone(&c.keys))
    }

    async fn refresh_for_rotation(&self) -> Result<Arc<JwkSet>, JwksError> {
        let _refresh = self.refresh.lock().await;

        // Unknown kids are attacker-controlled; don't let them drive fetches
        // faster than the retry interval.
        {
            let cached = self.cached.read().await;
            if let Some(c) = cached.as_ref() {
                if c.last_attempt_at.elapsed() < self.retry_interval {
                    return Ok(Arc::clone(&c.keys));
                }
            }
        }

        self.refresh_locked().await
    }

    /// Fetch and store a new key set. Callers must hold `self.refresh`.
    async fn refresh_locked(&self) -> Result<Arc<JwkSet>, JwksError> {
        match self.source.fetch().await {
            Ok(keys) => {
                let keys = Arc::new(keys);
                let now = Instant::now();
                *self.cached.write().await = Some(CachedKeys {
                    keys: Arc::clone(&keys),
                    last_attempt_at: now,
                    next_refresh_at: now + self.refresh_interval,
                });
                tracing::info!("Signing key set refreshed ({} keys)", keys.keys.len());
                Ok(keys)
            }
            Err(e) => {
                let mut cached = self.cached.write().await;
                match cached.as_mut() {
                    Some(c) => {
                        tracing::warn!("Signing key refresh failed, serving previous set: {}", e);
                        let now = Instant::now();
                        c.last_attempt_at = now;
                        c.next_refresh_at = now + self.retry_interval;
                        Ok(Arc::clone(&c.keys))
                    }
                    None => {
                        tracing::error!("Signing key fetch failed with no cached set: {}", e);
                        Err(e)
                    }
                }
            }
        }
    }
}

fn key_from_jwk(kid: &str, jwk: &jsonwebtoken::jwk::Jwk) -> Result<DecodingKey, JwksError> {
    DecodingKey::from_jwk(jwk).map_err(|e| JwksError::InvalidKey {
        kid: kid.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn key_set(kids: &[&str]) -> JwkSet {
        let keys: Vec<_> = kids
            .iter()
            .map(|kid| {
                json!({
                    "kty": "oct",
                    "kid": kid,
                    "alg": "HS256",
                    "k": "c3RhcnRlci1hcGktaW50ZWdyYXRpb24tdGVzdC1zZWNyZXQta2V5"
                })
            })
            .collect();
        serde_json::from_value(json!({ "keys": keys })).unwrap()
    }

    /// Replays scripted fetch results, then keeps failing.
    struct ScriptedSource {
        script: std::sync::Mutex<VecDeque<Result<JwkSet, JwksError>>>,
        fetches: AtomicUsize,
        delay: Duration,
    }

    impl ScriptedSource {
        fn new(script: Vec<Result<JwkSet, JwksError>>) -> Arc<Self> {
            Arc::new(Self {
                script: std::sync::Mutex::new(script.into()),
                fetches: AtomicUsize::new(0),
                delay: Duration::from_millis(10),
            })
        }

        fn fetches(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl KeySetSource for ScriptedSource {
        async fn fetch(&self) -> Result<JwkSet, JwksError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(JwksError::Fetch("connection refused".into())))
        }
    }

    fn cache(source: Arc<ScriptedSource>) -> JwksCache {
        JwksCache::new(source, Duration::from_secs(3600), Duration::from_secs(30))
    }

    fn kids(keys: &JwkSet) -> Vec<String> {
        keys.keys
            .iter()
            .filter_map(|k| k.common.key_id.clone())
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_cold_callers_fetch_once() {
        let source = ScriptedSource::new(vec![Ok(key_set(&["k1"]))]);
        let cache = Arc::new(cache(Arc::clone(&source)));

        let results = futures::future::join_all((0..10).map(|_| {
            let cache = Arc::clone(&cache);
            async move { cache.current_keys().await }
        }))
        .await;

        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(source.fetches(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_keys_are_served_from_cache() {
        let source = ScriptedSource::new(vec![Ok(key_set(&["k1"]))]);
        let cache = cache(Arc::clone(&source));

        cache.current_keys().await.unwrap();
        tokio::time::advance(Duration::from_secs(60)).await;
        cache.current_keys().await.unwrap();

        assert_eq!(source.fetches(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn keys_refresh_after_interval() {
        let source = ScriptedSource::new(vec![Ok(key_set(&["k1"])), Ok(key_set(&["k2"]))]);
        let cache = cache(Arc::clone(&source));

        assert_eq!(kids(&cache.current_keys().await.unwrap()), vec!["k1"]);
        tokio::time::advance(Duration::from_secs(3601)).await;
        assert_eq!(kids(&cache.current_keys().await.unwrap()), vec!["k2"]);
        assert_eq!(source.fetches(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_refresh_serves_previous_keys() {
        let source = ScriptedSource::new(vec![Ok(key_set(&["k1"]))]);
        let cache = cache(Arc::clone(&source));

        cache.current_keys().await.unwrap();
        tokio::time::advance(Duration::from_secs(3601)).await;

        let keys = cache.current_keys().await.unwrap();
        assert_eq!(kids(&keys), vec!["k1"]);
        assert_eq!(source.fetches(), 2);

        // The failure pushes the next attempt out by the retry interval.
        cache.current_keys().await.unwrap();
        assert_eq!(source.fetches(), 2);
        tokio::time::advance(Duration::from_secs(31)).await;
        cache.current_keys().await.unwrap();
        assert_eq!(source.fetches(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn cold_start_failure_propagates() {
        let source = ScriptedSource::new(vec![]);
        let cache = cache(Arc::clone(&source));

        let result = cache.current_keys().await;
        assert!(matches!(result, Err(JwksError::Fetch(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_kid_triggers_one_refresh() {
        let source = ScriptedSource::new(vec![Ok(key_set(&["k1"])), Ok(key_set(&["k1", "k2"]))]);
        let cache = cache(Arc::clone(&source));

        cache.current_keys().await.unwrap();
        tokio::time::advance(Duration::from_secs(31)).await;

        assert!(cache.decoding_key("k2").await.is_ok());
        assert_eq!(source.fetches(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_kid_refresh_is_rate_limited() {
        let source = ScriptedSource::new(vec![Ok(key_set(&["k1"])), Ok(key_set(&["k1"]))]);
        let cache = cache(Arc::clone(&source));

        cache.current_keys().await.unwrap();

        let result = cache.decoding_key("bogus").await;
        assert!(matches!(result, Err(JwksError::UnknownKey(_))));
        let result = cache.decoding_key("bogus").await;
        assert!(matches!(result, Err(JwksError::UnknownKey(_))));

        assert_eq!(source.fetches(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_kid_refresh_is_rate_limited_while_upstream_is_down() {
        let source = ScriptedSource::new(vec![Ok(key_set(&["k1"]))]);
        let cache = cache(Arc::clone(&source));

        cache.current_keys().await.unwrap();
        tokio::time::advance(Duration::from_secs(31)).await;

        // First lookup retries upstream and fails; the rest wait out the interval.
        for _ in 0..5 {
            let result = cache.decoding_key("bogus").await;
            assert!(matches!(result, Err(JwksError::UnknownKey(_))));
        }
        assert_eq!(source.fetches(), 2);

        tokio::time::advance(Duration::from_secs(31)).await;
        let result = cache.decoding_key("bogus").await;
        assert!(matches!(result, Err(JwksError::UnknownKey(_))));
        assert_eq!(source.fetches(), 3);
    }
}
