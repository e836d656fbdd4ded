//! Hashing and address-encoding helpers
//!
//! SHA-256 backs call selectors and token addresses; HASH160 plus
//! Base58Check produces signer and wallet addresses.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Computes SHA-256 hash of the input data
pub fn sha256(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// Computes double SHA-256 hash (SHA-256 of SHA-256)
pub fn double_sha256(data: &[u8]) -> Vec<u8> {
    sha256(&sha256(data))
}

/// Computes SHA-256 hash and returns it as a hex string
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// RIPEMD160(SHA256(data))
pub fn hash160(data: &[u8]) -> Vec<u8> {
    let mut ripemd = Ripemd160::new();
    ripemd.update(sha256(data));
    ripemd.finalize().to_vec()
}

/// Base58Check(version || payload || checksum)
///
/// The checksum is the first 4 bytes of the double SHA-256 of
/// `version || payload`.
pub fn base58check(version: u8, payload: &[u8]) -> String {
    let mut bytes = Vec::with_capacity(payload.len() + 5);
    bytes.push(version);
    bytes.extend_from_slice(payload);

    let checksum = double_sha256(&bytes);
    bytes.extend_from_slice(&checksum[..4]);

    bs58::encode(bytes).into_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256() {
        let data = b"hello world";
        let hash = sha256(data);
        assert_eq!(hash.len(), 32);
        assert_eq!(
            sha256_hex(data),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_hash160_length() {
        assert_eq!(hash160(b"pubkey").len(), 20);
    }

    #[test]
    fn test_base58check_version_prefix() {
        let payload = hash160(b"script");

        // Version 0x00 encodes with a leading '1', 0x05 with a leading '3'
        assert!(base58check(0x00, &payload).starts_with('1'));
        assert!(base58check(0x05, &payload).starts_with('3'));
    }

    #[test]
    fn test_base58check_is_deterministic() {
        let payload = hash160(b"same");
        assert_eq!(base58check(0x05, &payload), base58check(0x05, &payload));
        assert_ne!(
            base58check(0x05, &payload),
            base58check(0x05, &hash160(b"other"))
        );
    }
}
