//! External call dispatch
//!
//! The wallet never interprets what an approved request does. It hands a
//! [`Call`] to a [`Dispatcher`] and only observes whether it succeeded.
//!
//! # Example
//!
//! ```ignore
//! use playcoin_multisig::dispatch::{Call, Dispatcher};
//!
//! let call = Call::new(token_address, transfer_data);
//! match host.dispatch(&wallet_address, &call) {
//!     Ok(receipt) => println!("fee paid: {}", receipt.fee_paid),
//!     Err(e) => println!("dispatch failed: {}", e),
//! }
//! ```

pub mod abi;

use crate::core::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use abi::{selector, AbiError, Decoder, Encoder, Selector};

/// Errors reported by a dispatcher. The wallet treats all of them alike.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Out of gas: need {required}, have {available}")]
    OutOfGas { required: u128, available: u128 },
    #[error("Insufficient value: need {required}, have {available}")]
    InsufficientValue { required: u128, available: u128 },
    #[error("No contract at {0}")]
    UnknownTarget(Address),
    #[error("Malformed call data: {0}")]
    Abi(#[from] AbiError),
    #[error("Call reverted: {0}")]
    Reverted(String),
}

/// A single opaque invocation: `data` sent to `target`, carrying `value`
/// native units from the caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    pub target: Address,
    #[serde(with = "abi::hex_bytes")]
    pub data: Vec<u8>,
    #[serde(default)]
    pub value: u128,
}

impl Call {
    pub fn new(target: Address, data: Vec<u8>) -> Self {
        Self {
            target,
            data,
            value: 0,
        }
    }

    /// A plain native-value transfer with no call data
    pub fn transfer_value(to: Address, value: u128) -> Self {
        Self {
            target: to,
            data: Vec::new(),
            value,
        }
    }

    pub fn with_value(mut self, value: u128) -> Self {
        self.value = value;
        self
    }
}

/// What a successful dispatch cost the origin
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchReceipt {
    pub fee_paid: u128,
}

/// Performs approved calls on behalf of the wallet.
///
/// Implementations must be atomic: when `dispatch` returns an error, no state
/// visible to the wallet may have changed.
pub trait Dispatcher {
    fn dispatch(&mut self, origin: &Address, call: &Call) -> Result<DispatchReceipt, DispatchError>;
}
