//! PlayCoin Multisig: a quorum-gated multi-signature wallet in Rust
//!
//! This crate provides:
//! - An ordered signer registry with an owner-administered quorum threshold
//! - Transaction requests with confirmation and rejection ledgers
//! - Exactly-once dispatch of approved calls through a pluggable host
//! - An in-memory ledger host with native balances and ERC-20 style tokens
//! - secp256k1 signer keys with Base58Check addresses
//! - JSON persistence with rotating backups
//!
//! # Example
//!
//! ```rust
//! use playcoin_multisig::core::Address;
//! use playcoin_multisig::ledger::{LedgerConfig, LedgerHost};
//! use playcoin_multisig::multisig::{MultisigWallet, WalletConfig};
//! use playcoin_multisig::token::TokenCall;
//!
//! let (owner, admin) = (Address::from("owner"), Address::from("admin"));
//!
//! let mut host = LedgerHost::new(LedgerConfig::default());
//! let coin = host.deploy_token("PlayCoin", "PLY", 0, 1_000, &owner).unwrap().address;
//!
//! let config = WalletConfig::new(vec![owner.clone(), admin.clone()], 2, coin.clone()).unwrap();
//! let mut wallet = MultisigWallet::new(owner.clone(), config, host).unwrap();
//!
//! let vault = wallet.address().clone();
//! wallet.host_mut().tokens_mut().transfer(&coin, &owner, &vault, 100).unwrap();
//!
//! let data = TokenCall::Transfer { to: Address::from("user1"), amount: 1 }.encode().unwrap();
//! let id = wallet.request_tx(&owner, data, "send 1PLY to user1").unwrap().requested_id().unwrap();
//!
//! let receipt = wallet.sign_tx(&admin, id).unwrap();
//! assert!(receipt.executed(id));
//! assert_eq!(wallet.host().token_balance(&coin, &Address::from("user1")), 1);
//! ```

pub mod cli;
pub mod core;
pub mod crypto;
pub mod dispatch;
pub mod ledger;
pub mod multisig;
pub mod storage;
pub mod token;

// Re-export commonly used types
pub use core::{Address, Clock, SystemClock, FOREVER};
pub use crypto::KeyPair;
pub use dispatch::{Call, DispatchError, Dispatcher};
pub use ledger::{LedgerConfig, LedgerHost};
pub use multisig::{
    MultisigError, MultisigWallet, Proposal, Receipt, TransactionRequest, TxId, WalletConfig,
    WalletEvent,
};
pub use storage::{Storage, StorageConfig};
pub use token::{Token, TokenCall, TokenManager, TokenMetadata};
