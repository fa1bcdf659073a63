//! Cache Module
//!
//! Provides the score-indexed cache: values in a primary table with TTL,
//! keys in an ordered index for inclusive score range queries.

mod codec;
mod deadline;
mod item;
mod scored;
mod stats;


// Re-export public types
pub use codec::Encodable;
pub use deadline::Deadline;
pub use item::CacheItem;
pub use scored::ScoreIndexedCache;
pub use stats::CacheStats;

use std::time::Duration;

// == Public Constants ==
/// Maximum encoded value size in bytes (the Redis string limit)
pub const MAX_VALUE_SIZE: usize = 512 * 1024 * 1024; // 512 MB

/// Longest TTL accepted for a write. Redis rejects `PX` values that overflow
/// its signed millisecond clock, so this stays well below `i64::MAX` ms.
pub const MAX_TTL: Duration = Duration::from_millis(i64::MAX as u64 / 2);
