//! ERC-20 style token implementation
//!
//! Provides a fungible token with standard interface.

use crate::core::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Number of transfers kept in a token's history
const TRANSFER_HISTORY_LIMIT: usize = 100;

/// Token-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: u128, need: u128 },
    #[error("Insufficient allowance: have {have}, need {need}")]
    InsufficientAllowance { have: u128, need: u128 },
    #[error("Invalid amount: amount must be greater than 0")]
    InvalidAmount,
    #[error("Token not found: {0}")]
    TokenNotFound(Address),
    #[error("Token already exists: {0}")]
    TokenAlreadyExists(Address),
    #[error("Invalid address: cannot transfer to self")]
    SelfTransfer,
    #[error("Invalid symbol: must be 1-10 characters")]
    InvalidSymbol,
    #[error("Invalid name: must be 1-50 characters")]
    InvalidName,
    #[error("Invalid decimals: must be 0-18")]
    InvalidDecimals,
    #[error("Invalid supply: must be greater than 0")]
    InvalidSupply,
}

/// Token metadata (immutable after creation)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    /// Total supply (fixed at creation)
    pub total_supply: u128,
    /// Receives the whole supply at creation
    pub creator: Address,
    pub created_at: DateTime<Utc>,
}

impl TokenMetadata {
    /// Create new token metadata with validation
    pub fn new(
        name: String,
        symbol: String,
        decimals: u8,
        total_supply: u128,
        creator: Address,
    ) -> Result<Self, TokenError> {
        if name.is_empty() || name.len() > 50 {
            return Err(TokenError::InvalidName);
        }
        if symbol.is_empty() || symbol.len() > 10 {
            return Err(TokenError::InvalidSymbol);
        }
        if decimals > 18 {
            return Err(TokenError::InvalidDecimals);
        }
        if total_supply == 0 {
            return Err(TokenError::InvalidSupply);
        }

        Ok(Self {
            name,
            symbol,
            decimals,
            total_supply,
            creator,
            created_at: Utc::now(),
        })
    }

    /// One whole token in base units (10^decimals)
    pub fn one(&self) -> u128 {
        10u128.pow(self.decimals as u32)
    }
}

/// Transfer event (emitted when tokens are transferred)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransferEvent {
    pub token: Address,
    pub from: Address,
    pub to: Address,
    pub amount: u128,
    pub timestamp: DateTime<Utc>,
}

/// Approval event (emitted when allowance is set)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApprovalEvent {
    pub token: Address,
    pub owner: Address,
    pub spender: Address,
    pub amount: u128,
}

/// An ERC-20 style fungible token
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Token {
    pub address: Address,
    pub metadata: TokenMetadata,
    balances: HashMap<Address, u128>,
    /// owner -> (spender -> amount)
    allowances: HashMap<Address, HashMap<Address, u128>>,
    /// Most recent transfers, oldest first
    pub transfer_history: Vec<TransferEvent>,
}

impl Token {
    /// Create a new token with all supply allocated to creator
    pub fn new(address: Address, metadata: TokenMetadata) -> Self {
        let mut balances = HashMap::new();
        balances.insert(metadata.creator.clone(), metadata.total_supply);

        Self {
            address,
            metadata,
            balances,
            allowances: HashMap::new(),
            transfer_history: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn symbol(&self) -> &str {
        &self.metadata.symbol
    }

    pub fn total_supply(&self) -> u128 {
        self.metadata.total_supply
    }

    pub fn balance_of(&self, holder: &Address) -> u128 {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.allowances
            .get(owner)
            .and_then(|spenders| spenders.get(spender))
            .copied()
            .unwrap_or(0)
    }

    pub fn holder_count(&self) -> usize {
        self.balances.values().filter(|&&b| b > 0).count()
    }

    /// Move `amount` from `from` to `to`
    pub fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<TransferEvent, TokenError> {
        self.check_transfer(from, to, amount)?;
        Ok(self.apply_transfer(from, to, amount))
    }

    /// Set the allowance of `spender` over `owner`'s balance (0 revokes)
    pub fn approve(
        &mut self,
        owner: &Address,
        spender: &Address,
        amount: u128,
    ) -> Result<ApprovalEvent, TokenError> {
        self.allowances
            .entry(owner.clone())
            .or_default()
            .insert(spender.clone(), amount);

        Ok(ApprovalEvent {
            token: self.address.clone(),
            owner: owner.clone(),
            spender: spender.clone(),
            amount,
        })
    }

    /// Transfer on behalf of `from`, consuming `spender`'s allowance
    pub fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<TransferEvent, TokenError> {
        let allowance = self.allowance(from, spender);
        if allowance < amount {
            return Err(TokenError::InsufficientAllowance {
                have: allowance,
                need: amount,
            });
        }
        self.check_transfer(from, to, amount)?;

        if let Some(allowance) = self
            .allowances
            .get_mut(from)
            .and_then(|spenders| spenders.get_mut(spender))
        {
            *allowance -= amount;
        }

        Ok(self.apply_transfer(from, to, amount))
    }

    fn check_transfer(&self, from: &Address, to: &Address, amount: u128) -> Result<(), TokenError> {
        if amount == 0 {
            return Err(TokenError::InvalidAmount);
        }
        if from == to {
            return Err(TokenError::SelfTransfer);
        }
        let have = self.balance_of(from);
        if have < amount {
            return Err(TokenError::InsufficientBalance { have, need: amount });
        }
        Ok(())
    }

    fn apply_transfer(&mut self, from: &Address, to: &Address, amount: u128) -> TransferEvent {
        *self.balances.entry(from.clone()).or_insert(0) -= amount;
        *self.balances.entry(to.clone()).or_insert(0) += amount;

        let event = TransferEvent {
            token: self.address.clone(),
            from: from.clone(),
            to: to.clone(),
            amount,
            timestamp: Utc::now(),
        };

        self.transfer_history.push(event.clone());
        if self.transfer_history.len() > TRANSFER_HISTORY_LIMIT {
            self.transfer_history.remove(0);
        }

        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> Address {
        Address::from(s)
    }

    fn create_test_token() -> Token {
        let metadata = TokenMetadata::new(
            "PlayCoin".to_string(),
            "PLY".to_string(),
            18,
            1_000_000,
            addr("vault"),
        )
        .unwrap();

        Token::new(addr("0xTEST"), metadata)
    }

    #[test]
    fn test_token_creation() {
        let token = create_test_token();

        assert_eq!(token.name(), "PlayCoin");
        assert_eq!(token.symbol(), "PLY");
        assert_eq!(token.total_supply(), 1_000_000);
        assert_eq!(token.balance_of(&addr("vault")), 1_000_000);
        assert_eq!(token.holder_count(), 1);
        assert_eq!(token.metadata.one(), 1_000_000_000_000_000_000);
    }

    #[test]
    fn test_metadata_validation() {
        let mk = |name: &str, symbol: &str, decimals, supply| {
            TokenMetadata::new(name.into(), symbol.into(), decimals, supply, addr("c"))
        };

        assert_eq!(mk("", "TST", 18, 1000), Err(TokenError::InvalidName));
        assert_eq!(mk("Test", "TOOLONGSYMBOL", 18, 1000), Err(TokenError::InvalidSymbol));
        assert_eq!(mk("Test", "TST", 19, 1000), Err(TokenError::InvalidDecimals));
        assert_eq!(mk("Test", "TST", 18, 0), Err(TokenError::InvalidSupply));
    }

    #[test]
    fn test_transfer() {
        let mut token = create_test_token();

        let event = token.transfer(&addr("vault"), &addr("wallet"), 1000).unwrap();

        assert_eq!(event.from, addr("vault"));
        assert_eq!(event.to, addr("wallet"));
        assert_eq!(token.balance_of(&addr("vault")), 999_000);
        assert_eq!(token.balance_of(&addr("wallet")), 1000);
        assert_eq!(token.transfer_history.len(), 1);
    }

    #[test]
    fn test_transfer_failures_leave_balances() {
        let mut token = create_test_token();

        assert!(matches!(
            token.transfer(&addr("vault"), &addr("x"), 2_000_000),
            Err(TokenError::InsufficientBalance { .. })
        ));
        assert_eq!(
            token.transfer(&addr("vault"), &addr("x"), 0).unwrap_err(),
            TokenError::InvalidAmount
        );
        assert_eq!(
            token.transfer(&addr("vault"), &addr("vault"), 1).unwrap_err(),
            TokenError::SelfTransfer
        );
        assert_eq!(token.balance_of(&addr("vault")), 1_000_000);
        assert!(token.transfer_history.is_empty());
    }

    #[test]
    fn test_transfer_from() {
        let mut token = create_test_token();
        token.approve(&addr("vault"), &addr("spender"), 5000).unwrap();

        token
            .transfer_from(&addr("spender"), &addr("vault"), &addr("user"), 1000)
            .unwrap();

        assert_eq!(token.balance_of(&addr("user")), 1000);
        assert_eq!(token.allowance(&addr("vault"), &addr("spender")), 4000);

        assert!(matches!(
            token.transfer_from(&addr("spender"), &addr("vault"), &addr("user"), 5000),
            Err(TokenError::InsufficientAllowance { have: 4000, need: 5000 })
        ));
    }

    #[test]
    fn test_history_is_capped() {
        let mut token = create_test_token();
        for _ in 0..(TRANSFER_HISTORY_LIMIT + 5) {
            token.transfer(&addr("vault"), &addr("user"), 1).unwrap();
        }
        assert_eq!(token.transfer_history.len(), TRANSFER_HISTORY_LIMIT);
    }
}
