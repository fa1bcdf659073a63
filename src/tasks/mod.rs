//! Background Tasks Module
//!
//! Contains background tasks that run periodically alongside the cache.
//!
//! # Tasks
//! - TTL Cleanup: Purges expired values from the in-process store

mod cleanup;

pub use cleanup::spawn_cleanup_task;
