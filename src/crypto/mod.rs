//! Cryptographic utilities
//!
//! This module provides:
//! - SHA-256 and HASH160 hashing
//! - Base58Check address encoding
//! - ECDSA key management (secp256k1) for caller identities

pub mod hash;
pub mod keys;

pub use hash::{base58check, double_sha256, hash160, sha256, sha256_hex};
pub use keys::{public_key_from_hex, public_key_to_address, KeyError, KeyPair};
