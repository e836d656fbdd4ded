//! Token manager for creating and managing tokens
//!
//! Handles token deployment and routes token calls to the right contract.

use crate::core::Address;
use crate::crypto::sha256;
use crate::token::call::TokenCall;
use crate::token::token::{Token, TokenError, TokenMetadata, TransferEvent};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Manages all tokens deployed on the ledger
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TokenManager {
    tokens: HashMap<Address, Token>,
    /// Deployment counter for address generation
    nonce: u64,
}

impl TokenManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deploy a new token. The whole supply goes to `creator`.
    pub fn create_token(
        &mut self,
        name: String,
        symbol: String,
        decimals: u8,
        total_supply: u128,
        creator: &Address,
    ) -> Result<Token, TokenError> {
        let metadata = TokenMetadata::new(name, symbol, decimals, total_supply, creator.clone())?;

        let address = self.generate_address(creator, &metadata.symbol);
        self.nonce += 1;

        if self.tokens.contains_key(&address) {
            return Err(TokenError::TokenAlreadyExists(address));
        }

        let token = Token::new(address.clone(), metadata);
        self.tokens.insert(address.clone(), token.clone());

        log::info!(
            "Token created: {} ({}) at {}",
            token.name(),
            token.symbol(),
            address
        );

        Ok(token)
    }

    /// `0x` + first 40 hex chars of SHA-256(creator:symbol:nonce)
    fn generate_address(&self, creator: &Address, symbol: &str) -> Address {
        let input = format!("{}:{}:{}", creator, symbol, self.nonce);
        let hex = hex::encode(sha256(input.as_bytes()));
        Address::new(format!("0x{}", &hex[..40]))
    }

    pub fn get(&self, address: &Address) -> Option<&Token> {
        self.tokens.get(address)
    }

    pub fn exists(&self, address: &Address) -> bool {
        self.tokens.contains_key(address)
    }

    pub fn list(&self) -> Vec<&Token> {
        self.tokens.values().collect()
    }

    pub fn count(&self) -> usize {
        self.tokens.len()
    }

    pub fn balance_of(&self, token: &Address, holder: &Address) -> Result<u128, TokenError> {
        self.tokens
            .get(token)
            .map(|t| t.balance_of(holder))
            .ok_or_else(|| TokenError::TokenNotFound(token.clone()))
    }

    /// Direct transfer by a holder (outside any multisig flow)
    pub fn transfer(
        &mut self,
        token: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<TransferEvent, TokenError> {
        self.token_mut(token)?.transfer(from, to, amount)
    }

    /// Apply a decoded call made by `caller` against `token`
    pub fn execute(
        &mut self,
        token: &Address,
        caller: &Address,
        call: &TokenCall,
    ) -> Result<(), TokenError> {
        let token = self.token_mut(token)?;
        match call {
            TokenCall::Transfer { to, amount } => {
                token.transfer(caller, to, *amount)?;
            }
            TokenCall::Approve { spender, amount } => {
                token.approve(caller, spender, *amount)?;
            }
            TokenCall::TransferFrom { from, to, amount } => {
                token.transfer_from(caller, from, to, *amount)?;
            }
        }
        Ok(())
    }

    fn token_mut(&mut self, address: &Address) -> Result<&mut Token, TokenError> {
        self.tokens
            .get_mut(address)
            .ok_or_else(|| TokenError::TokenNotFound(address.clone()))
    }
}
