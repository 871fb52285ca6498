//! Value Objects for the storefront

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Catalog SKU: uppercased, at most [`Sku::MAX_LEN`] characters of
/// `A-Z`, `0-9`, `-` and `_`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Sku(String);

impl Sku {
    pub const MAX_LEN: usize = 50;

    pub fn new(value: impl Into<String>) -> Result<Self, SkuError> {
        let value = value.into().trim().to_uppercase();
        if value.is_empty() { return Err(SkuError::Empty); }
        if value.chars().count() > Self::MAX_LEN { return Err(SkuError::TooLong); }
        if let Some(c) = value.chars().find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_')) {
            return Err(SkuError::InvalidChar(c));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl TryFrom<String> for Sku {
    type Error = SkuError;
    fn try_from(value: String) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<Sku> for String {
    fn from(sku: Sku) -> Self { sku.0 }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkuError {
    #[error("SKU must not be empty")]
    Empty,
    #[error("SKU must be at most 50 characters")]
    TooLong,
    #[error("SKU contains invalid character {0:?}")]
    InvalidChar(char),
}

/// Human-readable order number: `ORD-<YYYYMMDDHHMMSS>-<6 chars>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderNumber(String);

const SUFFIX_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const SUFFIX_LEN: usize = 6;

impl OrderNumber {
    pub fn generate(at: DateTime<Utc>, rng: &mut impl Rng) -> Self {
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| SUFFIX_CHARSET[rng.gen_range(0..SUFFIX_CHARSET.len())] as char)
            .collect();
        Self(format!("ORD-{}-{}", at.format("%Y%m%d%H%M%S"), suffix))
    }
    pub fn as_str(&self) -> &str { &self.0 }
    pub fn into_inner(self) -> String { self.0 }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_sku() { let sku = Sku::new(" prod-001 ").unwrap(); assert_eq!(sku.as_str(), "PROD-001"); }

    #[test]
    fn test_sku_rejects_blank() { assert!(matches!(Sku::new("   "), Err(SkuError::Empty))); }

    #[test]
    fn test_sku_rejects_bad_input() {
        assert_eq!(Sku::new("lamp 01"), Err(SkuError::InvalidChar(' ')));
        assert_eq!(Sku::new("A".repeat(Sku::MAX_LEN + 1)), Err(SkuError::TooLong));
        assert!(Sku::new("A".repeat(Sku::MAX_LEN)).is_ok());
    }

    #[test]
    fn test_sku_deserialize_normalizes() {
        let sku: Sku = serde_json::from_str("\"kb_42\"").unwrap();
        assert_eq!(sku.as_str(), "KB_42");
        assert!(serde_json::from_str::<Sku>("\"\"").is_err());
    }

    #[test]
    fn test_order_number_shape() {
        let at = Utc.with_ymd_and_hms(2025, 11, 3, 19, 57, 11).unwrap();
        let number = OrderNumber::generate(at, &mut rand::thread_rng());
        let s = number.as_str();
        assert!(s.starts_with("ORD-20251103195711-"));
        let suffix = &s["ORD-20251103195711-".len()..];
        assert_eq!(suffix.len(), 6);
        assert!(suffix.bytes().all(|b| SUFFIX_CHARSET.contains(&b)));
    }
}
