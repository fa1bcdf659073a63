//! Score Cache - a score-indexed cache layer over Redis
//!
//! Stores values under a key with a TTL and indexes each key by a numeric
//! score, so cached items can be fetched by inclusive score range.

pub mod cache;
pub mod config;
pub mod error;
pub mod store;
pub mod tasks;

pub use cache::{CacheItem, CacheStats, Deadline, Encodable, ScoreIndexedCache};
pub use config::{Backend, CacheConfig};
pub use error::{CacheError, Result, StoreError};
pub use store::{MemoryStore, RedisStore, ScoreStore};
pub use tasks::spawn_cleanup_task;
