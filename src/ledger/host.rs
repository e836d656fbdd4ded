//! Ledger host implementation

use crate::core::{Address, Clock, SystemClock};
use crate::dispatch::{Call, DispatchError, DispatchReceipt, Dispatcher};
use crate::token::{Token, TokenCall, TokenError, TokenManager};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors from host bookkeeping outside a dispatch
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Balance overflow: {holder} holds {balance}, cannot add {amount}")]
    BalanceOverflow {
        holder: Address,
        balance: u128,
        amount: u128,
    },
}

/// Host parameters
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Native units burned from the origin for every successful dispatch
    pub gas_fee: u128,
}

/// Counters over the host's lifetime
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerStats {
    pub dispatched: u64,
    pub failed: u64,
    pub fees_burned: u128,
}

/// Native balances plus deployed tokens
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LedgerHost {
    config: LedgerConfig,
    native: HashMap<Address, u128>,
    tokens: TokenManager,
    /// Fixed block time; wall-clock time when unset
    #[serde(default)]
    pinned_time: Option<u64>,
    #[serde(default)]
    stats: LedgerStats,
}

impl LedgerHost {
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn stats(&self) -> &LedgerStats {
        &self.stats
    }

    pub fn set_gas_fee(&mut self, gas_fee: u128) {
        self.config.gas_fee = gas_fee;
    }

    /// Pin block time to `timestamp`
    pub fn set_timestamp(&mut self, timestamp: u64) {
        self.pinned_time = Some(timestamp);
    }

    /// Move pinned block time forward (pins the current time first if unset)
    pub fn advance(&mut self, seconds: u64) {
        let now = self.now();
        self.pinned_time = Some(now.saturating_add(seconds));
    }

    /// Mint native value to `to` (faucet / plain deposit)
    pub fn credit(&mut self, to: &Address, amount: u128) -> Result<(), LedgerError> {
        let balance = self.native_balance(to);
        let updated = balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::BalanceOverflow {
                holder: to.clone(),
                balance,
                amount,
            })?;
        self.native.insert(to.clone(), updated);
        log::debug!("Credited {} native to {}", amount, to);
        Ok(())
    }

    pub fn native_balance(&self, holder: &Address) -> u128 {
        self.native.get(holder).copied().unwrap_or(0)
    }

    pub fn deploy_token(
        &mut self,
        name: &str,
        symbol: &str,
        decimals: u8,
        total_supply: u128,
        creator: &Address,
    ) -> Result<Token, TokenError> {
        self.tokens.create_token(
            name.to_string(),
            symbol.to_string(),
            decimals,
            total_supply,
            creator,
        )
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    pub fn tokens_mut(&mut self) -> &mut TokenManager {
        &mut self.tokens
    }

    /// Balance of `holder` in `token`; 0 for unknown tokens
    pub fn token_balance(&self, token: &Address, holder: &Address) -> u128 {
        self.tokens.balance_of(token, holder).unwrap_or(0)
    }

    /// Every check that can fail, with no mutation
    fn prepare(&self, origin: &Address, call: &Call) -> Result<Option<TokenCall>, DispatchError> {
        let available = self.native_balance(origin);
        let fee = self.config.gas_fee;
        if available < fee {
            return Err(DispatchError::OutOfGas {
                required: fee,
                available,
            });
        }
        let required = fee.saturating_add(call.value);
        if available < required {
            return Err(DispatchError::InsufficientValue {
                required,
                available,
            });
        }

        if call.value > 0
            && &call.target != origin
            && self.native_balance(&call.target).checked_add(call.value).is_none()
        {
            return Err(DispatchError::Reverted(format!(
                "native balance of {} would overflow",
                call.target
            )));
        }

        if call.data.is_empty() {
            return Ok(None);
        }

        let token = self
            .tokens
            .get(&call.target)
            .ok_or_else(|| DispatchError::UnknownTarget(call.target.clone()))?;
        let token_call = TokenCall::decode(&call.data)?;

        // Dry run against a copy so a failing call leaves the real token untouched
        let mut dry_run = token.clone();
        let result = match &token_call {
            TokenCall::Transfer { to, amount } => dry_run.transfer(origin, to, *amount).map(|_| ()),
            TokenCall::Approve { spender, amount } => {
                dry_run.approve(origin, spender, *amount).map(|_| ())
            }
            TokenCall::TransferFrom { from, to, amount } => {
                dry_run.transfer_from(origin, from, to, *amount).map(|_| ())
            }
        };
        result.map_err(|e| DispatchError::Reverted(e.to_string()))?;

        Ok(Some(token_call))
    }
}

impl Dispatcher for LedgerHost {
    fn dispatch(&mut self, origin: &Address, call: &Call) -> Result<DispatchReceipt, DispatchError> {
        let token_call = match self.prepare(origin, call) {
            Ok(token_call) => token_call,
            Err(e) => {
                self.stats.failed += 1;
                log::debug!("Dispatch from {} to {} failed: {}", origin, call.target, e);
                return Err(e);
            }
        };

        if let Some(token_call) = token_call {
            self.tokens
                .execute(&call.target, origin, &token_call)
                .map_err(|e| DispatchError::Reverted(e.to_string()))?;
        }
        let fee = self.config.gas_fee;
        *self.native.entry(origin.clone()).or_insert(0) -= fee + call.value;
        if call.value > 0 {
            *self.native.entry(call.target.clone()).or_insert(0) += call.value;
        }

        self.stats.dispatched += 1;
        self.stats.fees_burned = self.stats.fees_burned.saturating_add(fee);
        log::debug!(
            "Dispatched {} bytes from {} to {} (value {}, fee {})",
            call.data.len(),
            origin,
            call.target,
            call.value,
            fee
        );

        Ok(DispatchReceipt { fee_paid: fee })
    }
}

impl Clock for LedgerHost {
    fn now(&self) -> u64 {
        self.pinned_time.unwrap_or_else(|| SystemClock.now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> Address {
        Address::from(s)
    }

    fn host_with_token() -> (LedgerHost, Address) {
        let mut host = LedgerHost::new(LedgerConfig::default());
        let token = host
            .deploy_token("PlayCoin", "PLY", 18, 1_000_000, &addr("vault"))
            .unwrap();
        (host, token.address)
    }

    fn transfer(to: &str, amount: u128) -> Vec<u8> {
        TokenCall::Transfer {
            to: addr(to),
            amount,
        }
        .encode()
        .unwrap()
    }

    #[test]
    fn test_token_call_dispatch() {
        let (mut host, token) = host_with_token();

        let call = Call::new(token.clone(), transfer("user1", 100));
        let receipt = host.dispatch(&addr("vault"), &call).unwrap();

        assert_eq!(receipt.fee_paid, 0);
        assert_eq!(host.token_balance(&token, &addr("user1")), 100);
        assert_eq!(host.stats().dispatched, 1);
    }

    #[test]
    fn test_gas_fee_charged_and_required() {
        let (mut host, token) = host_with_token();
        host.set_gas_fee(10);
        let call = Call::new(token.clone(), transfer("user1", 100));

        let err = host.dispatch(&addr("vault"), &call).unwrap_err();
        assert_eq!(
            err,
            DispatchError::OutOfGas {
                required: 10,
                available: 0
            }
        );
        assert_eq!(host.token_balance(&token, &addr("user1")), 0);
        assert_eq!(host.stats().failed, 1);

        host.credit(&addr("vault"), 25).unwrap();
        host.dispatch(&addr("vault"), &call).unwrap();
        assert_eq!(host.native_balance(&addr("vault")), 15);
        assert_eq!(host.stats().fees_burned, 10);
    }

    #[test]
    fn test_reverted_call_is_atomic() {
        let (mut host, token) = host_with_token();
        host.set_gas_fee(1);
        host.credit(&addr("poor"), 5).unwrap();

        // `poor` holds no tokens
        let call = Call::new(token.clone(), transfer("user1", 1));
        let err = host.dispatch(&addr("poor"), &call).unwrap_err();

        assert!(matches!(err, DispatchError::Reverted(_)));
        assert_eq!(host.native_balance(&addr("poor")), 5);
        assert_eq!(host.stats().fees_burned, 0);
    }

    #[test]
    fn test_value_transfer() {
        let mut host = LedgerHost::default();
        host.credit(&addr("wallet"), 1_000).unwrap();

        host.dispatch(&addr("wallet"), &Call::transfer_value(addr("vault"), 100))
            .unwrap();
        assert_eq!(host.native_balance(&addr("wallet")), 900);
        assert_eq!(host.native_balance(&addr("vault")), 100);

        let err = host
            .dispatch(&addr("wallet"), &Call::transfer_value(addr("vault"), 5_000))
            .unwrap_err();
        assert!(matches!(err, DispatchError::InsufficientValue { .. }));
    }

    #[test]
    fn test_credit_overflow_is_rejected() {
        let mut host = LedgerHost::default();
        host.credit(&addr("wallet"), u128::MAX - 1).unwrap();

        assert_eq!(
            host.credit(&addr("wallet"), 2).unwrap_err(),
            LedgerError::BalanceOverflow {
                holder: addr("wallet"),
                balance: u128::MAX - 1,
                amount: 2
            }
        );
        assert_eq!(host.native_balance(&addr("wallet")), u128::MAX - 1);
    }

    #[test]
    fn test_value_transfer_cannot_overflow_target() {
        let mut host = LedgerHost::default();
        host.credit(&addr("wallet"), 10).unwrap();
        host.credit(&addr("vault"), u128::MAX - 5).unwrap();

        let err = host
            .dispatch(&addr("wallet"), &Call::transfer_value(addr("vault"), 10))
            .unwrap_err();
        assert!(matches!(err, DispatchError::Reverted(_)));
        assert_eq!(host.native_balance(&addr("wallet")), 10);
    }

    #[test]
    fn test_unknown_target_and_bad_data() {
        let (mut host, token) = host_with_token();

        let err = host
            .dispatch(&addr("vault"), &Call::new(addr("0xnothing"), transfer("a", 1)))
            .unwrap_err();
        assert_eq!(err, DispatchError::UnknownTarget(addr("0xnothing")));

        let err = host
            .dispatch(&addr("vault"), &Call::new(token, vec![1, 2, 3, 4, 5]))
            .unwrap_err();
        assert!(matches!(err, DispatchError::Abi(_)));
    }

    #[test]
    fn test_pinned_clock() {
        let mut host = LedgerHost::default();
        host.set_timestamp(1_000);
        assert_eq!(host.now(), 1_000);

        host.advance(60);
        assert_eq!(host.now(), 1_060);
    }
}
