//! Store Module
//!
//! The store protocol consumed by the cache, with a Redis implementation
//! and an in-process implementation.

mod entry;
mod memory;
mod redis;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::StoreResult;

pub use self::redis::RedisStore;
pub use entry::{duration_ms, StoredValue};
pub use memory::MemoryStore;

// == Score Store ==
/// Primitives the cache needs from a remote key-value store: a primary
/// table with per-key expiry and named ordered indexes.
///
/// Index ranges are inclusive on both ends and ordered by score, then by
/// member bytes for equal scores.
#[async_trait]
pub trait ScoreStore: Send + Sync + 'static {
    /// Liveness check.
    async fn ping(&self) -> StoreResult<()>;

    /// Upserts `key -> value`, expiring after `ttl`.
    async fn set_value(&self, key: &str, value: &[u8], ttl: Duration) -> StoreResult<()>;

    /// Reads a value. `None` means absent or expired.
    async fn get_value(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Removes a value, returning whether it existed.
    async fn delete_value(&self, key: &str) -> StoreResult<bool>;

    /// Inserts `member` into `index` or moves it to `score`.
    async fn index_upsert(&self, index: &str, member: &str, score: f64) -> StoreResult<()>;

    /// Returns the `(member, score)` window `[offset, offset + limit)` of
    /// members with `min <= score <= max`.
    async fn index_range(
        &self,
        index: &str,
        min: f64,
        max: f64,
        offset: usize,
        limit: usize,
    ) -> StoreResult<Vec<(String, f64)>>;

    /// Removes `member` from `index`, returning whether it was present.
    async fn index_remove(&self, index: &str, member: &str) -> StoreResult<bool>;

    /// Releases the connection.
    async fn close(&self);
}

/// Shared stores, so a background task can hold the same store as the cache.
#[async_trait]
impl<T: ScoreStore + ?Sized> ScoreStore for Arc<T> {
    async fn ping(&self) -> StoreResult<()> {
        (**self).ping().await
    }

    async fn set_value(&self, key: &str, value: &[u8], ttl: Duration) -> StoreResult<()> {
        (**self).set_value(key, value, ttl).await
    }

    async fn get_value(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        (**self).get_value(key).await
    }

    async fn delete_value(&self, key: &str) -> StoreResult<bool> {
        (**self).delete_value(key).await
    }

    async fn index_upsert(&self, index: &str, member: &str, score: f64) -> StoreResult<()> {
        (**self).index_upsert(index, member, score).await
    }

    async fn index_range(
        &self,
        index: &str,
        min: f64,
        max: f64,
        offset: usize,
        limit: usize,
    ) -> StoreResult<Vec<(String, f64)>> {
        (**self).index_range(index, min, max, offset, limit).await
    }

    async fn index_remove(&self, index: &str, member: &str) -> StoreResult<bool> {
        (**self).index_remove(index, member).await
    }

    async fn close(&self) {
        (**self).close().await
    }
}
