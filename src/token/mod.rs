//! ERC-20 style fungible token used as the governed asset
//!
//! Provides:
//! - Balances per address
//! - Allowances for delegated transfers
//! - Transfer and approve operations
//! - Call-data encoding for the operations a wallet can request
//!
//! # Example
//!
//! ```ignore
//! use playcoin_multisig::token::{TokenCall, TokenManager};
//!
//! let mut manager = TokenManager::new();
//! let token = manager.create_token("PlayCoin".into(), "PLY".into(), 18, 1_000_000, &vault)?;
//!
//! // Encode a transfer for a multisig request
//! let data = TokenCall::Transfer { to: user1, amount: 1000 }.encode()?;
//! ```

pub mod call;
pub mod manager;
pub mod token;

pub use call::TokenCall;
pub use manager::TokenManager;
pub use token::{ApprovalEvent, Token, TokenError, TokenMetadata, TransferEvent};
