//! Stored Value Module
//!
//! A primary-table value held by the in-process store, with its expiry.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

// == Stored Value ==
/// Represents a single encoded value with metadata.
#[derive(Debug, Clone)]
pub struct StoredValue {
    /// The encoded payload
    pub bytes: Vec<u8>,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
}

impl StoredValue {
    // == Constructor ==
    /// Creates a new value that expires `ttl` from now.
    pub fn new(bytes: Vec<u8>, ttl: Duration) -> Self {
        let now = current_timestamp_ms();
        Self {
            bytes,
            created_at: now,
            expires_at: now.saturating_add(duration_ms(ttl)),
        }
    }

    // == Is Expired ==
    /// Checks if the value has expired.
    ///
    /// A value is expired once the current time reaches its expiration
    /// timestamp, so a fully elapsed TTL is never readable.
    pub fn is_expired(&self) -> bool {
        current_timestamp_ms() >= self.expires_at
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, `0` once expired.
    pub fn ttl_remaining_ms(&self) -> u64 {
        self.expires_at.saturating_sub(current_timestamp_ms())
    }
}

// == Utility Functions ==
/// Converts a duration to whole milliseconds, saturating at `u64::MAX`.
pub fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_value_creation() {
        let value = StoredValue::new(b"payload".to_vec(), Duration::from_secs(60));

        assert_eq!(value.bytes, b"payload");
        assert!(value.expires_at > value.created_at);
        assert!(!value.is_expired());
    }

    #[test]
    fn test_value_expiration() {
        let value = StoredValue::new(b"payload".to_vec(), Duration::from_millis(50));

        assert!(!value.is_expired());

        // Wait for expiration
        sleep(Duration::from_millis(120));

        assert!(value.is_expired());
        assert_eq!(value.ttl_remaining_ms(), 0);
    }

    #[test]
    fn test_ttl_remaining_ms() {
        let value = StoredValue::new(Vec::new(), Duration::from_secs(10));

        let remaining = value.ttl_remaining_ms();
        assert!(remaining <= 10_000);
        assert!(remaining >= 9_000);
    }

    #[test]
    fn test_huge_ttl_saturates_instead_of_wrapping() {
        // 18_446_744_073_709_552 seconds is just past u64::MAX milliseconds
        let value = StoredValue::new(Vec::new(), Duration::from_secs(18_446_744_073_709_552));

        assert_eq!(value.expires_at, u64::MAX);
        assert!(!value.is_expired());
        assert_eq!(duration_ms(Duration::MAX), u64::MAX);
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = current_timestamp_ms();
        let value = StoredValue {
            bytes: Vec::new(),
            created_at: now,
            expires_at: now, // Expires exactly at creation time
        };

        assert!(value.is_expired(), "Value should be expired at boundary");
    }
}
