//! The session key/value store: the only mutable shared state in the core.
//!
//! Everything the turn controller persists — session JSON, per-session
//! locks, idempotency markers — goes through the [`SessionStore`] trait.
//! The in-memory [`MemoryStore`] engine backs tests and single-node
//! deployments; any store offering atomic set-if-absent and compare-and-set
//! can implement the trait.

pub mod error;
pub mod keys;
pub mod memory;

use async_trait::async_trait;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;

/// Atomic key/value operations with per-key TTL.
///
/// All operations are atomic with respect to each other for a given key.
/// Transport failures surface as [`StoreError::Unavailable`]; callers treat
/// a failed `cas_update` transport as a retryable conflict.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch the value at `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Unconditional put with TTL.
    async fn setex(&self, key: &str, ttl_seconds: u64, value: &[u8]) -> Result<()>;

    async fn exists(&self, key: &str) -> Result<bool>;

    /// Set-if-absent with TTL. Returns `true` when this caller now holds
    /// the lock.
    async fn try_acquire_lock(
        &self,
        lock_key: &str,
        holder_token: &str,
        ttl_seconds: u64,
    ) -> Result<bool>;

    /// Release only if the stored value still matches `holder_token`, so a
    /// late owner cannot drop a successor's lock.
    async fn release_lock(&self, lock_key: &str, holder_token: &str) -> Result<()>;

    /// Atomic compare-and-set. `expected` of `None` means "expect absent".
    /// Returns `true` iff the stored value equalled `expected` at the
    /// moment of the write.
    async fn cas_update(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        new: &[u8],
        ttl_seconds: u64,
    ) -> Result<bool>;
}
