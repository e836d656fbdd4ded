//! Core primitives shared by every component
//!
//! - Addresses (signers, tokens, the wallet itself)
//! - The host clock used for expiry checks

pub mod address;
pub mod clock;

pub use address::Address;
pub use clock::{Clock, SystemClock, FOREVER};
