//! Calls a wallet can make to itself
//!
//! A request whose target is the wallet's own address carries one of these.
//! The wallet decodes and runs it with itself as the caller, which is the
//! only way `refund_principal` can succeed.

use crate::core::Address;
use crate::dispatch::{selector, AbiError, Decoder, Encoder};

const REFUND_PRINCIPAL: &str = "refundPrincipal(address,uint256)";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WalletCall {
    /// Send `amount` native value held by the wallet to `to`
    RefundPrincipal { to: Address, amount: u128 },
}

impl WalletCall {
    pub fn encode(&self) -> Result<Vec<u8>, AbiError> {
        match self {
            WalletCall::RefundPrincipal { to, amount } => Ok(Encoder::new(selector(
                REFUND_PRINCIPAL,
            ))
            .address(to)?
            .amount(*amount)
            .finish()),
        }
    }

    pub fn decode(data: &[u8]) -> Result<Self, AbiError> {
        let (sel, mut args) = Decoder::new(data)?;
        if sel != selector(REFUND_PRINCIPAL) {
            return Err(AbiError::unknown_selector(sel));
        }
        let call = WalletCall::RefundPrincipal {
            to: args.address()?,
            amount: args.amount()?,
        };
        args.finish()?;
        Ok(call)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenCall;

    #[test]
    fn test_refund_decodes() {
        let call = WalletCall::RefundPrincipal {
            to: Address::from("vault"),
            amount: 100_000_000_000_000,
        };
        assert_eq!(WalletCall::decode(&call.encode().unwrap()).unwrap(), call);
    }

    #[test]
    fn test_token_calls_are_not_wallet_calls() {
        let data = TokenCall::Transfer {
            to: Address::from("vault"),
            amount: 1,
        }
        .encode()
        .unwrap();
        assert!(matches!(
            WalletCall::decode(&data),
            Err(AbiError::UnknownSelector(_))
        ));
    }
}
