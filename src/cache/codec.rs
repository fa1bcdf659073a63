//! Value Codec Module
//!
//! Maps cached values to and from the store's byte strings.

use crate::error::{CacheError, Result};

// == Encodable ==
/// A value type that can be written to and read back from the store.
pub trait Encodable: Sized {
    /// Encodes the value into its wire bytes.
    fn encode(&self) -> Result<Vec<u8>>;

    /// Decodes a value from wire bytes.
    fn decode(bytes: Vec<u8>) -> Result<Self>;
}

impl Encodable for String {
    fn encode(&self) -> Result<Vec<u8>> {
        Ok(self.as_bytes().to_vec())
    }

    fn decode(bytes: Vec<u8>) -> Result<Self> {
        String::from_utf8(bytes)
            .map_err(|e| CacheError::Encoding(format!("value is not valid UTF-8: {e}")))
    }
}

impl Encodable for Vec<u8> {
    fn encode(&self) -> Result<Vec<u8>> {
        Ok(self.clone())
    }

    fn decode(bytes: Vec<u8>) -> Result<Self> {
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_codec() {
        let bytes = "Value for item 1".to_string().encode().unwrap();
        assert_eq!(String::decode(bytes).unwrap(), "Value for item 1");
    }

    #[test]
    fn test_string_decode_rejects_invalid_utf8() {
        let result = String::decode(vec![0xff, 0xfe]);
        assert!(matches!(result, Err(CacheError::Encoding(_))));
    }

    #[test]
    fn test_bytes_are_passed_through() {
        let raw = vec![0u8, 159, 146, 150];
        assert_eq!(Vec::<u8>::decode(raw.encode().unwrap()).unwrap(), raw);
    }
}
