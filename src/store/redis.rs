//! Redis Store Module
//!
//! [`ScoreStore`] over a multiplexed Redis connection. Values map to plain
//! string keys, ordered indexes map to sorted sets.

use std::time::Duration;

use ::redis::aio::MultiplexedConnection;
use ::redis::{Client, IntoConnectionInfo};
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::{duration_ms, ScoreStore};
use crate::error::{StoreError, StoreResult};

/// Redis parses `LIMIT` arguments as signed 64-bit integers.
fn window_arg(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

// == Redis Store ==
/// Redis-backed store. The connection is cloned per command, so concurrent
/// callers share one pipelined socket.
pub struct RedisStore {
    conn: RwLock<Option<MultiplexedConnection>>,
}

impl RedisStore {
    // == Connect ==
    /// Opens a connection to `address` (host:port) selecting `database`.
    ///
    /// Does not verify liveness; callers ping.
    pub async fn connect(
        address: &str,
        credential: Option<&str>,
        database: i64,
    ) -> StoreResult<Self> {
        let mut info = format!("redis://{address}/{database}").into_connection_info()?;
        info.redis.password = credential.map(str::to_owned);

        let client = Client::open(info)?;
        let conn = client.get_multiplexed_async_connection().await?;
        info!("Connected to redis at {} (db {})", address, database);

        Ok(Self {
            conn: RwLock::new(Some(conn)),
        })
    }

    async fn conn(&self) -> StoreResult<MultiplexedConnection> {
        self.conn.read().await.clone().ok_or(StoreError::Closed)
    }
}

#[async_trait]
impl ScoreStore for RedisStore {
    async fn ping(&self) -> StoreResult<()> {
        let mut conn = self.conn().await?;
        let pong: String = ::redis::cmd("PING").query_async(&mut conn).await?;
        debug!("PING -> {}", pong);
        Ok(())
    }

    async fn set_value(&self, key: &str, value: &[u8], ttl: Duration) -> StoreResult<()> {
        let mut conn = self.conn().await?;
        let ttl_ms = duration_ms(ttl).max(1);
        let _: () = ::redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("PX")
            .arg(ttl_ms)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn get_value(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let mut conn = self.conn().await?;
        let value: Option<Vec<u8>> = ::redis::cmd("GET").arg(key).query_async(&mut conn).await?;
        Ok(value)
    }

    async fn delete_value(&self, key: &str) -> StoreResult<bool> {
        let mut conn = self.conn().await?;
        let removed: i64 = ::redis::cmd("DEL").arg(key).query_async(&mut conn).await?;
        Ok(removed > 0)
    }

    async fn index_upsert(&self, index: &str, member: &str, score: f64) -> StoreResult<()> {
        let mut conn = self.conn().await?;
        let _: i64 = ::redis::cmd("ZADD")
            .arg(index)
            .arg(score)
            .arg(member)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn index_range(
        &self,
        index: &str,
        min: f64,
        max: f64,
        offset: usize,
        limit: usize,
    ) -> StoreResult<Vec<(String, f64)>> {
        let mut conn = self.conn().await?;
        let pairs: Vec<(String, f64)> = ::redis::cmd("ZRANGEBYSCORE")
            .arg(index)
            .arg(min)
            .arg(max)
            .arg("WITHSCORES")
            .arg("LIMIT")
            .arg(window_arg(offset))
            .arg(window_arg(limit))
            .query_async(&mut conn)
            .await?;
        Ok(pairs)
    }

    async fn index_remove(&self, index: &str, member: &str) -> StoreResult<bool> {
        let mut conn = self.conn().await?;
        let removed: i64 = ::redis::cmd("ZREM")
            .arg(index)
            .arg(member)
            .query_async(&mut conn)
            .await?;
        Ok(removed > 0)
    }

    async fn close(&self) {
        if self.conn.write().await.take().is_some() {
            info!("Redis connection released");
        }
    }
}
