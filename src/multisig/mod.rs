//! Quorum-gated multi-signature wallet
//!
//! A fixed owner administers an ordered set of signers. Any signer may open a
//! transaction request against the governed token contract (or an explicit
//! target); once `quorum` distinct signers have confirmed it, the encoded call
//! is dispatched exactly once with the wallet as origin.
//!
//! # Example
//!
//! ```ignore
//! use playcoin_multisig::ledger::{LedgerConfig, LedgerHost};
//! use playcoin_multisig::multisig::{MultisigWallet, WalletConfig};
//! use playcoin_multisig::token::TokenCall;
//!
//! let config = WalletConfig::new(vec![owner.clone(), admin.clone(), vault.clone()], 2, coin)?;
//! let mut wallet = MultisigWallet::new(owner, config, LedgerHost::new(LedgerConfig::default()))?;
//!
//! let data = TokenCall::Transfer { to: user1, amount: 1 }.encode()?;
//! let id = wallet.request_tx(&vault, data, "send 1PLY to user1")?.requested_id();
//!
//! // Second confirmation reaches quorum and dispatches the transfer
//! let receipt = wallet.sign_tx(&admin, id.unwrap())?;
//! ```

pub mod call;
pub mod config;
pub mod error;
pub mod events;
pub mod request;
pub mod signers;
pub mod store;
pub mod wallet;

pub use call::WalletCall;
pub use config::WalletConfig;
pub use error::MultisigError;
pub use events::{Receipt, RemovalRefusal, WalletEvent};
pub use request::{Proposal, QuorumOutlook, RequestStatus, TransactionRequest, TxId};
pub use signers::SignerRegistry;
pub use store::RequestStore;
pub use wallet::{MultisigWallet, WalletState};
