//! Account and contract addresses

use serde::{Deserialize, Serialize};
use std::fmt;

/// An account or contract address.
///
/// Addresses are opaque strings: Base58 key-derived addresses for signers,
/// `0x`-prefixed hashes for deployed tokens and P2SH-style strings for wallets.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Address {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_conversions() {
        let a = Address::from("alice");
        let b: Address = "alice".to_string().into();

        assert_eq!(a, b);
        assert_eq!(a.to_string(), "alice");
        assert_eq!(a.as_str(), "alice");
        assert!(!a.is_empty());
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let a = Address::from("0xabc");
        assert_eq!(serde_json::to_string(&a).unwrap(), "\"0xabc\"");

        let back: Address = serde_json::from_str("\"0xabc\"").unwrap();
        assert_eq!(back, a);
    }
}
