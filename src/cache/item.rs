//! Cache Item Module
//!
//! The record returned by score range queries.

use serde::Serialize;

// == Cache Item ==
/// One cached value together with its key and index score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheItem<V> {
    /// Primary-table key, identical to the index member
    pub key: String,
    /// Score the key is indexed under
    pub score: f64,
    /// The decoded value
    pub value: V,
}

impl<V> CacheItem<V> {
    /// Creates a new CacheItem
    pub fn new(key: impl Into<String>, score: f64, value: V) -> Self {
        Self {
            key: key.into(),
            score,
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_serialize() {
        let item = CacheItem::new("item3", 150.0, "Value for item 3".to_string());
        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(
            json,
            r#"{"key":"item3","score":150.0,"value":"Value for item 3"}"#
        );
    }
}
