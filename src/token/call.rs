//! Token operations as call data
//!
//! A multisig request carries one of these, encoded, as its opaque payload.

use crate::core::Address;
use crate::dispatch::{selector, AbiError, Decoder, Encoder};

const TRANSFER: &str = "transfer(address,uint256)";
const APPROVE: &str = "approve(address,uint256)";
const TRANSFER_FROM: &str = "transferFrom(address,address,uint256)";

/// A call against a [`Token`](super::Token), made by the dispatch origin
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenCall {
    Transfer { to: Address, amount: u128 },
    Approve { spender: Address, amount: u128 },
    TransferFrom { from: Address, to: Address, amount: u128 },
}

impl TokenCall {
    pub fn encode(&self) -> Result<Vec<u8>, AbiError> {
        let data = match self {
            TokenCall::Transfer { to, amount } => Encoder::new(selector(TRANSFER))
                .address(to)?
                .amount(*amount),
            TokenCall::Approve { spender, amount } => Encoder::new(selector(APPROVE))
                .address(spender)?
                .amount(*amount),
            TokenCall::TransferFrom { from, to, amount } => Encoder::new(selector(TRANSFER_FROM))
                .address(from)?
                .address(to)?
                .amount(*amount),
        };
        Ok(data.finish())
    }

    pub fn decode(data: &[u8]) -> Result<Self, AbiError> {
        let (sel, mut args) = Decoder::new(data)?;

        let call = if sel == selector(TRANSFER) {
            TokenCall::Transfer {
                to: args.address()?,
                amount: args.amount()?,
            }
        } else if sel == selector(APPROVE) {
            TokenCall::Approve {
                spender: args.address()?,
                amount: args.amount()?,
            }
        } else if sel == selector(TRANSFER_FROM) {
            TokenCall::TransferFrom {
                from: args.address()?,
                to: args.address()?,
                amount: args.amount()?,
            }
        } else {
            return Err(AbiError::unknown_selector(sel));
        };

        args.finish()?;
        Ok(call)
    }
}
