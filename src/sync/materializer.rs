use std::fmt::{Debug, Display};
use std::future::Future;
use std::hash::Hash;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::keyed_mutex::KeyedMutex;
use super::presence::{Presence, PresenceCache};

/// Failure of a create call, as reported by the authoritative store.
#[derive(Debug)]
pub enum CreateError<E> {
    /// Someone else created the resource first.
    Duplicate,
    Other(E),
}

#[derive(Debug, Error)]
pub enum MaterializeError<E> {
    #[error("a recent attempt failed; retry after backoff")]
    Backoff,

    #[error("existence check failed: {0}")]
    Load(E),

    #[error("create failed: {0}")]
    Create(E),
}

/// Creates a resource on first demand, at most once per key at a time.
///
/// The presence cache short-circuits keys already known to exist; the keyed
/// mutex makes the check-then-create step exclusive per key.
pub struct Materializer<K> {
    locks: KeyedMutex<K>,
    cache: PresenceCache<K>,
}

impl<K> Materializer<K>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
{
    pub fn new(present_ttl: Duration, absent_ttl: Duration, max_entries: u64) -> Self {
        Self {
            locks: KeyedMutex::new(),
            cache: PresenceCache::new(present_ttl, absent_ttl, max_entries),
        }
    }

    /// Make sure the resource named by `key` exists.
    ///
    /// `load` is the authoritative existence check; `create` materializes the
    /// resource and is only called while holding the key's lock.
    pub async fn ensure<L, LF, C, CF, E>(
        &self,
        key: &K,
        load: L,
        create: C,
    ) -> Result<Presence, MaterializeError<E>>
    where
        L: FnOnce() -> LF,
        LF: Future<Output = Result<bool, E>>,
        C: FnOnce() -> CF,
        CF: Future<Output = Result<(), CreateError<E>>>,
        E: Display,
    {
        if let Some(known) = self.cached(key) {
            return known;
        }

        let _guard = self.locks.acquire(key.clone()).await;

        // Whoever held the lock before us may have settled the key already.
        if let Some(known) = self.cached(key) {
            return known;
        }

        match load().await {
            Ok(true) => {
                debug!("Resource {:?} already exists", key);
                self.cache.mark_present(key.clone());
                return Ok(Presence::Present);
            }
            Ok(false) => {}
            Err(e) => {
                warn!("Existence check for {:?} failed: {}", key, e);
                self.cache.mark_absent(key.clone());
                return Err(MaterializeError::Load(e));
            }
        }

        match create().await {
            Ok(()) => {
                info!("Materialized resource {:?}", key);
                self.cache.mark_present(key.clone());
                Ok(Presence::Present)
            }
            Err(CreateError::Duplicate) => {
                debug!("Resource {:?} was created concurrently elsewhere", key);
                self.cache.mark_present(key.clone());
                Ok(Presence::Present)
            }
            Err(CreateError::Other(e)) => {
                warn!("Failed to materialize {:?}: {}", key, e);
                self.cache.mark_absent(key.clone());
                Err(MaterializeError::Create(e))
            }
        }
    }

    fn cached<E>(&self, key: &K) -> Option<Result<Presence, MaterializeError<E>>> {
        match self.cache.get(key)? {
            Presence::Present => Some(Ok(Presence::Present)),
            Presence::Absent => {
                debug!("Skipping {:?}, last attempt failed recently", key);
                Some(Err(MaterializeError::Backoff))
            }
        }
    }
}
