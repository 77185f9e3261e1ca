use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Slot = Arc<AsyncMutex<()>>;
type SlotMap<K> = Arc<Mutex<HashMap<K, Slot>>>;

/// A registry of async mutexes addressed by key.
///
/// Callers with the same key are serialized, callers with different keys never
/// wait on each other. Slots are created on first use and removed as soon as
/// no guard or waiter references them, so the map only ever holds keys that
/// are currently contended.
pub struct KeyedMutex<K> {
    slots: SlotMap<K>,
}

impl<K> KeyedMutex<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            slots: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Wait for exclusive access to `key`. Access is released when the
    /// returned guard is dropped, including when the holding future is
    /// cancelled.
    pub async fn acquire(&self, key: K) -> KeyedGuard<K> {
        let handle = SlotHandle::checkout(&self.slots, key);
        let guard = Arc::clone(&handle.slot).lock_owned().await;

        KeyedGuard {
            _guard: guard,
            _handle: handle,
        }
    }

    /// Number of keys that currently have a holder or waiter.
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K> Default for KeyedMutex<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Clone for KeyedMutex<K> {
    fn clone(&self) -> Self {
        Self {
            slots: Arc::clone(&self.slots),
        }
    }
}

/// Exclusive access to one key of a [`KeyedMutex`].
pub struct KeyedGuard<K>
where
    K: Eq + Hash,
{
    // Field order matters: the mutex is unlocked before the slot is reclaimed.
    _guard: OwnedMutexGuard<()>,
    _handle: SlotHandle<K>,
}

/// A counted reference to a registry slot. Dropping the last one removes the
/// slot from the map.
struct SlotHandle<K>
where
    K: Eq + Hash,
{
    key: K,
    slot: Slot,
    slots: SlotMap<K>,
}

impl<K> SlotHandle<K>
where
    K: Eq + Hash + Clone,
{
    fn checkout(slots: &SlotMap<K>, key: K) -> Self {
        let slot = {
            let mut map = slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(
                map.entry(key.clone())
                    .or_insert_with(|| Arc::new(AsyncMutex::new(()))),
            )
        };

        Self {
            key,
            slot,
            slots: Arc::clone(slots),
        }
    }
}

impl<K> Drop for SlotHandle<K>
where
    K: Eq + Hash,
{
    fn drop(&mut self) {
        // New references are only handed out under the map lock, so the count
        // cannot grow while we hold it. Two references means the map and us.
        let mut map = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let unreferenced = map
            .get(&self.key)
            .map(|slot| Arc::ptr_eq(slot, &self.slot) && Arc::strong_count(&self.slot) <= 2)
            .unwrap_or(false);

        if unreferenced {
            map.remove(&self.key);
        }
    }
}
