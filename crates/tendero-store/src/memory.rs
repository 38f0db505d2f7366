use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::trace;

use crate::error::Result;
use crate::SessionStore;

/// One stored value with its expiry deadline.
#[derive(Debug, Clone)]
struct Slot {
    value: Vec<u8>,
    expires_at: Instant,
}

impl Slot {
    fn new(value: Vec<u8>, ttl_seconds: u64) -> Self {
        Self {
            value,
            expires_at: Instant::now() + Duration::from_secs(ttl_seconds),
        }
    }

    fn expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// In-memory [`SessionStore`] engine.
///
/// Expiry is enforced lazily: an expired slot is treated as absent by every
/// operation and removed when encountered. Per-key atomicity comes from the
/// DashMap shard entry API — each operation holds the shard lock for the
/// duration of its read-modify-write.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: DashMap<String, Slot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (non-expired) keys. Test and introspection helper.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|e| !e.value().expired()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match self.slots.entry(key.to_string()) {
            Entry::Occupied(entry) => {
                if entry.get().expired() {
                    entry.remove();
                    Ok(None)
                } else {
                    Ok(Some(entry.get().value.clone()))
                }
            }
            Entry::Vacant(_) => Ok(None),
        }
    }

    async fn setex(&self, key: &str, ttl_seconds: u64, value: &[u8]) -> Result<()> {
        trace!(key, ttl_seconds, bytes = value.len(), "setex");
        self.slots
            .insert(key.to_string(), Slot::new(value.to_vec(), ttl_seconds));
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }

    async fn try_acquire_lock(
        &self,
        lock_key: &str,
        holder_token: &str,
        ttl_seconds: u64,
    ) -> Result<bool> {
        match self.slots.entry(lock_key.to_string()) {
            Entry::Occupied(mut entry) => {
                if entry.get().expired() {
                    // Predecessor crashed or overran its TTL — reclaim.
                    entry.insert(Slot::new(holder_token.as_bytes().to_vec(), ttl_seconds));
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(Slot::new(holder_token.as_bytes().to_vec(), ttl_seconds));
                Ok(true)
            }
        }
    }

    async fn release_lock(&self, lock_key: &str, holder_token: &str) -> Result<()> {
        self.slots
            .remove_if(lock_key, |_, slot| slot.value == holder_token.as_bytes());
        Ok(())
    }

    async fn cas_update(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        new: &[u8],
        ttl_seconds: u64,
    ) -> Result<bool> {
        match self.slots.entry(key.to_string()) {
            Entry::Occupied(mut entry) => {
                let current = entry.get();
                let live = !current.expired();
                let matches = match expected {
                    Some(bytes) => live && current.value == bytes,
                    None => !live,
                };
                if matches {
                    entry.insert(Slot::new(new.to_vec(), ttl_seconds));
                    Ok(true)
                } else {
                    if !live {
                        entry.remove();
                    }
                    Ok(false)
                }
            }
            Entry::Vacant(entry) => {
                if expected.is_none() {
                    entry.insert(Slot::new(new.to_vec(), ttl_seconds));
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn setex_then_get_roundtrips() {
        let store = MemoryStore::new();
        store.setex("k", 60, b"v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(b"v".to_vec()));
        assert!(store.exists("k").await.unwrap());
    }

    #[tokio::test]
    async fn zero_ttl_expires_immediately() {
        let store = MemoryStore::new();
        store.setex("k", 0, b"v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
        assert!(!store.exists("k").await.unwrap());
    }

    #[tokio::test]
    async fn lock_is_exclusive_until_released() {
        let store = MemoryStore::new();
        assert!(store.try_acquire_lock("l", "a", 30).await.unwrap());
        assert!(!store.try_acquire_lock("l", "b", 30).await.unwrap());

        store.release_lock("l", "a").await.unwrap();
        assert!(store.try_acquire_lock("l", "b", 30).await.unwrap());
    }

    #[tokio::test]
    async fn release_with_wrong_token_keeps_lock() {
        let store = MemoryStore::new();
        assert!(store.try_acquire_lock("l", "a", 30).await.unwrap());

        // A late previous owner must not drop the current holder's lock.
        store.release_lock("l", "stale").await.unwrap();
        assert!(!store.try_acquire_lock("l", "b", 30).await.unwrap());
    }

    #[tokio::test]
    async fn expired_lock_is_reclaimable() {
        let store = MemoryStore::new();
        assert!(store.try_acquire_lock("l", "crashed", 0).await.unwrap());
        assert!(store.try_acquire_lock("l", "next", 30).await.unwrap());
    }

    #[tokio::test]
    async fn cas_succeeds_only_on_matching_value() {
        let store = MemoryStore::new();
        store.setex("k", 60, b"one").await.unwrap();

        assert!(!store.cas_update("k", Some(b"zero"), b"two", 60).await.unwrap());
        assert_eq!(store.get("k").await.unwrap(), Some(b"one".to_vec()));

        assert!(store.cas_update("k", Some(b"one"), b"two", 60).await.unwrap());
        assert_eq!(store.get("k").await.unwrap(), Some(b"two".to_vec()));
    }

    #[tokio::test]
    async fn cas_with_expect_absent() {
        let store = MemoryStore::new();
        assert!(store.cas_update("k", None, b"v", 60).await.unwrap());
        // Second expect-absent write must lose.
        assert!(!store.cas_update("k", None, b"w", 60).await.unwrap());
        assert_eq!(store.get("k").await.unwrap(), Some(b"v".to_vec()));
    }

    #[tokio::test]
    async fn cas_treats_expired_value_as_absent() {
        let store = MemoryStore::new();
        store.setex("k", 0, b"gone").await.unwrap();
        assert!(!store.cas_update("k", Some(b"gone"), b"v", 60).await.unwrap());
        assert!(store.cas_update("k", None, b"v", 60).await.unwrap());
    }
}
