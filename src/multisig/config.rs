//! Wallet construction parameters

use crate::core::Address;
use crate::multisig::error::MultisigError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Parameters a wallet is deployed with
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WalletConfig {
    /// Initial signers, in order
    pub signers: Vec<Address>,
    /// Minimum confirmations required (M in M-of-N)
    pub quorum: u32,
    /// Token contract requests target by default
    pub governed_asset: Address,
}

impl WalletConfig {
    /// Create a validated configuration
    ///
    /// # Errors
    /// Returns error if the signer list is empty or has duplicates, or if the
    /// quorum is zero or larger than the signer count.
    pub fn new(
        signers: Vec<Address>,
        quorum: u32,
        governed_asset: Address,
    ) -> Result<Self, MultisigError> {
        let config = Self {
            signers,
            quorum,
            governed_asset,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants `new` enforces (for configs loaded from disk)
    pub fn validate(&self) -> Result<(), MultisigError> {
        if self.signers.is_empty() {
            return Err(MultisigError::EmptySignerSet);
        }
        if self.quorum == 0 {
            return Err(MultisigError::InvalidThreshold(
                "quorum must be at least 1".to_string(),
            ));
        }
        if self.quorum as usize > self.signers.len() {
            return Err(MultisigError::InvalidThreshold(format!(
                "quorum {} exceeds signer count {}",
                self.quorum,
                self.signers.len()
            )));
        }

        let mut seen = HashSet::new();
        for signer in &self.signers {
            if !seen.insert(signer) {
                return Err(MultisigError::DuplicateSigner(signer.clone()));
            }
        }

        Ok(())
    }

    /// Description like "2-of-3"
    pub fn description(&self) -> String {
        format!("{}-of-{}", self.quorum, self.signers.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signers(names: &[&str]) -> Vec<Address> {
        names.iter().map(|n| Address::from(*n)).collect()
    }

    #[test]
    fn test_config_creation() {
        let config = WalletConfig::new(
            signers(&["owner", "admin", "vault"]),
            2,
            Address::from("0xcoin"),
        )
        .unwrap();

        assert_eq!(config.description(), "2-of-3");
    }

    #[test]
    fn test_single_signer_quorum_one() {
        assert!(WalletConfig::new(signers(&["solo"]), 1, Address::from("0xcoin")).is_ok());
    }

    #[test]
    fn test_config_validation() {
        let coin = Address::from("0xcoin");

        assert_eq!(
            WalletConfig::new(vec![], 1, coin.clone()),
            Err(MultisigError::EmptySignerSet)
        );
        assert!(matches!(
            WalletConfig::new(signers(&["a", "b"]), 0, coin.clone()),
            Err(MultisigError::InvalidThreshold(_))
        ));
        assert!(matches!(
            WalletConfig::new(signers(&["a", "b"]), 3, coin.clone()),
            Err(MultisigError::InvalidThreshold(_))
        ));
        assert_eq!(
            WalletConfig::new(signers(&["a", "b", "a"]), 2, coin),
            Err(MultisigError::DuplicateSigner(Address::from("a")))
        );
    }
}
