//! Score-Indexed Cache Module
//!
//! Combines a primary table (key -> value with TTL) and an ordered index
//! (key -> score) behind one store connection.
//!
//! A key is written to the index first and to the primary table second.
//! Between those two steps, or after the value expires on its own, the
//! index holds a member with no value. Range queries drop such members.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::cache::stats::StatsRecorder;
use crate::cache::{CacheItem, CacheStats, Deadline, Encodable, MAX_TTL, MAX_VALUE_SIZE};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result, StoreError};
use crate::store::{RedisStore, ScoreStore};

// == Score Indexed Cache ==
/// Cache whose entries can be read by key or by score range.
pub struct ScoreIndexedCache<S: ScoreStore = RedisStore> {
    /// Store connection handle
    store: S,
    /// Ordered index owned by this instance
    index_name: String,
    /// TTL applied by `set`
    default_ttl: Duration,
    closed: AtomicBool,
    stats: StatsRecorder,
}

impl ScoreIndexedCache<RedisStore> {
    // == Connect ==
    /// Connects to Redis using `config` and verifies the server answers PING.
    ///
    /// Any failure is returned as `CacheError::Connection` without retrying.
    pub async fn connect(config: &CacheConfig) -> Result<Self> {
        let store = RedisStore::connect(&config.address, config.credential(), config.database)
            .await
            .map_err(|e| CacheError::Connection(format!("{}: {}", config.address, e)))?;
        Self::open(store, config.index_name.clone(), config.default_ttl).await
    }
}

impl<S: ScoreStore> ScoreIndexedCache<S> {
    // == Open ==
    /// Wraps an existing store connection and verifies it answers PING.
    ///
    /// # Arguments
    /// * `store` - Connected store
    /// * `index_name` - Name of the ordered index used by this cache
    /// * `default_ttl` - TTL applied to every write
    pub async fn open(
        store: S,
        index_name: impl Into<String>,
        default_ttl: Duration,
    ) -> Result<Self> {
        let index_name = index_name.into();
        if index_name.is_empty() {
            return Err(CacheError::Validation(
                "Index name cannot be empty".to_string(),
            ));
        }
        if default_ttl.is_zero() {
            return Err(CacheError::Validation(
                "Default TTL must be positive".to_string(),
            ));
        }
        if default_ttl > MAX_TTL {
            return Err(CacheError::Validation(format!(
                "Default TTL exceeds maximum of {}s",
                MAX_TTL.as_secs()
            )));
        }

        store
            .ping()
            .await
            .map_err(|e| CacheError::Connection(format!("ping failed: {e}")))?;
        info!(
            "Score cache ready: index={}, default_ttl={}s",
            index_name,
            default_ttl.as_secs()
        );

        Ok(Self {
            store,
            index_name,
            default_ttl,
            closed: AtomicBool::new(false),
            stats: StatsRecorder::default(),
        })
    }

    /// Returns the ordered index name.
    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Returns the TTL applied by `set`.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    // == Set ==
    /// Stores `value` under `key` and indexes `key` by `score`, using the
    /// default TTL.
    pub async fn set<V: Encodable>(
        &self,
        deadline: &Deadline,
        key: &str,
        value: &V,
        score: f64,
    ) -> Result<()> {
        self.set_with_ttl(deadline, key, value, score, self.default_ttl)
            .await
    }

    /// Stores `value` under `key` with an explicit TTL.
    ///
    /// The index is written first. On `IndexWrite` nothing changed; on
    /// `ValueWrite` the index member stays without a value and the call
    /// can be retried as is.
    pub async fn set_with_ttl<V: Encodable>(
        &self,
        deadline: &Deadline,
        key: &str,
        value: &V,
        score: f64,
        ttl: Duration,
    ) -> Result<()> {
        self.ensure_open()?;
        validate_key(key)?;
        if !score.is_finite() {
            return Err(CacheError::Validation(format!(
                "Score for key '{}' must be a finite number, got {}",
                key, score
            )));
        }
        if ttl.is_zero() {
            return Err(CacheError::Validation("TTL must be positive".to_string()));
        }
        if ttl > MAX_TTL {
            return Err(CacheError::Validation(format!(
                "TTL exceeds maximum of {}s",
                MAX_TTL.as_secs()
            )));
        }

        let bytes = value.encode()?;
        if bytes.len() > MAX_VALUE_SIZE {
            return Err(CacheError::Encoding(format!(
                "Value exceeds maximum size of {} bytes",
                MAX_VALUE_SIZE
            )));
        }

        deadline
            .run(self.store.index_upsert(&self.index_name, key, score))
            .await
            .map_err(|e| {
                self.closed_or(e, |source| CacheError::IndexWrite {
                    key: key.to_string(),
                    source,
                })
            })?;

        if let Err(source) = deadline
            .run(self.store.set_value(key, &bytes, ttl))
            .await
        {
            warn!(
                "Value write failed after index write for key '{}': {}",
                key, source
            );
            return Err(self.closed_or(source, |source| CacheError::ValueWrite {
                key: key.to_string(),
                source,
            }));
        }

        self.stats.record_write();
        debug!("SET {} score={} ttl={}ms", key, score, ttl.as_millis());
        Ok(())
    }

    // == Get ==
    /// Reads the value stored under `key`. The index is not consulted.
    ///
    /// Returns `NotFound` if the key was never written or has expired.
    pub async fn get<V: Encodable>(&self, deadline: &Deadline, key: &str) -> Result<V> {
        self.ensure_open()?;
        validate_key(key)?;
        self.lookup(deadline, key).await
    }

    // == Get By Score Range ==
    /// Returns cached items with `min <= score <= max` in ascending score
    /// order (ties by key), skipping `offset` index members and reading at
    /// most `limit`.
    ///
    /// The window is applied by the store before values are read. Members
    /// whose value cannot be read are dropped, so the result may be shorter
    /// than `limit` even when more members match. A `limit` of zero returns
    /// an empty list without contacting the store.
    pub async fn get_by_score_range<V: Encodable>(
        &self,
        deadline: &Deadline,
        min: f64,
        max: f64,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<CacheItem<V>>> {
        self.ensure_open()?;
        if !min.is_finite() || !max.is_finite() {
            return Err(CacheError::Validation(format!(
                "Range bounds must be finite numbers, got [{}, {}]",
                min, max
            )));
        }
        if min > max {
            return Err(CacheError::Validation(format!(
                "Range minimum {} exceeds maximum {}",
                min, max
            )));
        }
        if limit == 0 {
            return Ok(Vec::new());
        }

        let members = deadline
            .run(
                self.store
                    .index_range(&self.index_name, min, max, offset, limit),
            )
            .await
            .map_err(|e| self.closed_or(e, CacheError::Store))?;
        debug!(
            "RANGE [{}, {}] offset={} limit={} -> {} members",
            min,
            max,
            offset,
            limit,
            members.len()
        );

        let mut items = Vec::with_capacity(members.len());
        for (key, score) in members {
            match self.lookup::<V>(deadline, &key).await {
                Ok(value) => items.push(CacheItem { key, score, value }),
                Err(CacheError::NotFound(_)) => {
                    debug!("Dropping index member '{}' with no value", key);
                    self.stats.record_drop();
                }
                Err(e) => {
                    warn!("Dropping index member '{}': {}", key, e);
                    self.stats.record_drop();
                }
            }
        }

        Ok(items)
    }

    // == Delete ==
    /// Removes `key` from the index and the primary table.
    ///
    /// The index member goes first. Returns true if either structure held
    /// the key.
    pub async fn delete(&self, deadline: &Deadline, key: &str) -> Result<bool> {
        self.ensure_open()?;
        validate_key(key)?;

        let indexed = deadline
            .run(self.store.index_remove(&self.index_name, key))
            .await
            .map_err(|e| {
                self.closed_or(e, |source| CacheError::IndexWrite {
                    key: key.to_string(),
                    source,
                })
            })?;
        let stored = deadline
            .run(self.store.delete_value(key))
            .await
            .map_err(|e| {
                self.closed_or(e, |source| CacheError::ValueWrite {
                    key: key.to_string(),
                    source,
                })
            })?;

        debug!("DEL {} indexed={} stored={}", key, indexed, stored);
        Ok(indexed || stored)
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    // == Close ==
    /// Releases the store connection. Later calls return `Closed`; closing
    /// twice is a no-op.
    pub async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            debug!("Score cache already closed");
            return Ok(());
        }
        self.store.close().await;
        info!("Score cache closed: index={}", self.index_name);
        Ok(())
    }

    /// Returns true once `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    async fn lookup<V: Encodable>(&self, deadline: &Deadline, key: &str) -> Result<V> {
        match deadline.run(self.store.get_value(key)).await {
            Ok(Some(bytes)) => {
                self.stats.record_hit();
                V::decode(bytes)
            }
            Ok(None) => {
                self.stats.record_miss();
                Err(CacheError::NotFound(key.to_string()))
            }
            Err(e) => Err(self.closed_or(e, CacheError::Store)),
        }
    }

    /// Maps a store failure to `Closed` when `close` raced the call,
    /// otherwise wraps it with `wrap`.
    fn closed_or(
        &self,
        err: StoreError,
        wrap: impl FnOnce(StoreError) -> CacheError,
    ) -> CacheError {
        match err {
            StoreError::Closed if self.is_closed() => CacheError::Closed,
            other => wrap(other),
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            Err(CacheError::Closed)
        } else {
            Ok(())
        }
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::Validation("Key cannot be empty".to_string()));
    }
    Ok(())
}
