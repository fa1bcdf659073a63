//! In-process Store Module
//!
//! HashMap primary table with TTL plus BTreeSet ordered indexes.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::ops::Bound;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ScoreStore, StoredValue};
use crate::error::{StoreError, StoreResult};

// == Index Position ==
/// Sort key of an index member: score first, member bytes for ties.
#[derive(Debug, Clone)]
struct Position {
    score: f64,
    member: String,
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Position {}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| self.member.as_bytes().cmp(other.member.as_bytes()))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// == Ordered Index ==
#[derive(Debug, Default)]
struct OrderedIndex {
    scores: HashMap<String, f64>,
    order: BTreeSet<Position>,
}

impl OrderedIndex {
    fn upsert(&mut self, member: &str, score: f64) {
        // -0.0 and 0.0 must share a position
        let score = score + 0.0;
        if let Some(old) = self.scores.insert(member.to_string(), score) {
            self.order.remove(&Position {
                score: old,
                member: member.to_string(),
            });
        }
        self.order.insert(Position {
            score,
            member: member.to_string(),
        });
    }

    fn remove(&mut self, member: &str) -> bool {
        match self.scores.remove(member) {
            Some(score) => {
                self.order.remove(&Position {
                    score,
                    member: member.to_string(),
                });
                true
            }
            None => false,
        }
    }

    fn range(&self, min: f64, max: f64, offset: usize, limit: usize) -> Vec<(String, f64)> {
        let start = Position {
            score: min + 0.0,
            member: String::new(),
        };
        self.order
            .range((Bound::Included(start), Bound::Unbounded))
            .take_while(|pos| pos.score <= max)
            .skip(offset)
            .take(limit)
            .map(|pos| (pos.member.clone(), pos.score))
            .collect()
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    values: HashMap<String, StoredValue>,
    indexes: HashMap<String, OrderedIndex>,
}

// == Memory Store ==
/// In-process implementation of [`ScoreStore`].
///
/// Expired values read as absent and are purged by
/// [`MemoryStore::purge_expired`]; index members never expire.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
    closed: AtomicBool,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // == Purge Expired ==
    /// Removes all expired values from the primary table.
    ///
    /// Returns the number of values removed.
    pub async fn purge_expired(&self) -> usize {
        let mut state = self.state.write().await;
        let before = state.values.len();
        state.values.retain(|_, value| !value.is_expired());
        before - state.values.len()
    }

    /// Returns the number of values held, expired or not.
    pub async fn value_count(&self) -> usize {
        self.state.read().await.values.len()
    }

    /// Returns the number of members in `index`.
    pub async fn index_len(&self, index: &str) -> usize {
        self.state
            .read()
            .await
            .indexes
            .get(index)
            .map_or(0, |idx| idx.scores.len())
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.closed.load(AtomicOrdering::Acquire) {
            Err(StoreError::Closed)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ScoreStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        self.ensure_open()
    }

    async fn set_value(&self, key: &str, value: &[u8], ttl: Duration) -> StoreResult<()> {
        self.ensure_open()?;
        let mut state = self.state.write().await;
        state
            .values
            .insert(key.to_string(), StoredValue::new(value.to_vec(), ttl));
        Ok(())
    }

    async fn get_value(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.ensure_open()?;
        let state = self.state.read().await;
        Ok(state
            .values
            .get(key)
            .filter(|value| !value.is_expired())
            .map(|value| value.bytes.clone()))
    }

    async fn delete_value(&self, key: &str) -> StoreResult<bool> {
        self.ensure_open()?;
        let mut state = self.state.write().await;
        Ok(state
            .values
            .remove(key)
            .is_some_and(|value| !value.is_expired()))
    }

    async fn index_upsert(&self, index: &str, member: &str, score: f64) -> StoreResult<()> {
        self.ensure_open()?;
        let mut state = self.state.write().await;
        state
            .indexes
            .entry(index.to_string())
            .or_default()
            .upsert(member, score);
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
        self.ensure_open()?;
        let state = self.state.read().await;
        Ok(state
            .indexes
            .get(index)
            .map(|idx| idx.range(min, max, offset, limit))
            .unwrap_or_default())
    }

    async fn index_remove(&self, index: &str, member: &str) -> StoreResult<bool> {
        self.ensure_open()?;
        let mut state = self.state.write().await;
        Ok(state
            .indexes
            .get_mut(index)
            .is_some_and(|idx| idx.remove(member)))
    }

    async fn close(&self) {
        self.closed.store(true, AtomicOrdering::Release);
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(300);

    #[tokio::test]
    async fn test_value_set_and_get() {
        let store = MemoryStore::new();

        store.set_value("key1", b"value1", TTL).await.unwrap();

        assert_eq!(
            store.get_value("key1").await.unwrap(),
            Some(b"value1".to_vec())
        );
        assert_eq!(store.get_value("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_value_expires() {
        let store = MemoryStore::new();

        store
            .set_value("short", b"v", Duration::from_millis(50))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(120)).await;

        assert_eq!(store.get_value("short").await.unwrap(), None);
        assert_eq!(store.value_count().await, 1);
        assert_eq!(store.purge_expired().await, 1);
        assert_eq!(store.value_count().await, 0);
    }

    #[tokio::test]
    async fn test_delete_value() {
        let store = MemoryStore::new();

        store.set_value("key1", b"v", TTL).await.unwrap();

        assert!(store.delete_value("key1").await.unwrap());
        assert!(!store.delete_value("key1").await.unwrap());
    }

    #[tokio::test]
    async fn test_index_upsert_moves_member() {
        let store = MemoryStore::new();

        store.index_upsert("idx", "a", 1.0).await.unwrap();
        store.index_upsert("idx", "a", 5.0).await.unwrap();

        assert_eq!(store.index_len("idx").await, 1);
        let range = store.index_range("idx", 0.0, 10.0, 0, 10).await.unwrap();
        assert_eq!(range, vec![("a".to_string(), 5.0)]);
    }

    #[tokio::test]
    async fn test_index_range_inclusive_and_tie_break() {
        let store = MemoryStore::new();

        store.index_upsert("idx", "b", 2.0).await.unwrap();
        store.index_upsert("idx", "a", 2.0).await.unwrap();
        store.index_upsert("idx", "low", 1.0).await.unwrap();
        store.index_upsert("idx", "high", 3.0).await.unwrap();
        store.index_upsert("idx", "out", 3.5).await.unwrap();

        let range = store.index_range("idx", 1.0, 3.0, 0, 10).await.unwrap();
        let members: Vec<&str> = range.iter().map(|(m, _)| m.as_str()).collect();
        assert_eq!(members, vec!["low", "a", "b", "high"]);
    }

    #[tokio::test]
    async fn test_index_range_window() {
        let store = MemoryStore::new();

        for (i, member) in ["a", "b", "c", "d"].iter().enumerate() {
            store.index_upsert("idx", member, i as f64).await.unwrap();
        }

        let range = store.index_range("idx", 0.0, 10.0, 1, 2).await.unwrap();
        assert_eq!(
            range,
            vec![("b".to_string(), 1.0), ("c".to_string(), 2.0)]
        );
        assert!(store
            .index_range("idx", 0.0, 10.0, 10, 2)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_index_range_accepts_huge_window() {
        let store = MemoryStore::new();

        store.index_upsert("idx", "a", 1.0).await.unwrap();

        let range = store
            .index_range("idx", 0.0, 10.0, 0, usize::MAX)
            .await
            .unwrap();
        assert_eq!(range, vec![("a".to_string(), 1.0)]);
        assert!(store
            .index_range("idx", 0.0, 10.0, usize::MAX, usize::MAX)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_indexes_are_separate() {
        let store = MemoryStore::new();

        store.index_upsert("one", "a", 1.0).await.unwrap();

        assert!(store
            .index_range("two", 0.0, 10.0, 0, 10)
            .await
            .unwrap()
            .is_empty());
        assert!(!store.index_remove("two", "a").await.unwrap());
        assert!(store.index_remove("one", "a").await.unwrap());
    }

    #[tokio::test]
    async fn test_closed_store_rejects_commands() {
        let store = MemoryStore::new();

        store.close().await;

        assert_eq!(store.ping().await, Err(StoreError::Closed));
        assert_eq!(store.get_value("k").await, Err(StoreError::Closed));
    }
}
