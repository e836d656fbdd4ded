//! Ordered signer set and quorum threshold

use crate::core::Address;
use crate::multisig::error::MultisigError;
use serde::{Deserialize, Serialize};

/// The authorized signers, in insertion order, and the quorum threshold.
///
/// Invariants: no duplicates, `1 <= quorum <= signers.len()`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignerRegistry {
    signers: Vec<Address>,
    quorum: u32,
}

impl SignerRegistry {
    /// Build a registry; callers validate through `WalletConfig` first
    pub(crate) fn new(signers: Vec<Address>, quorum: u32) -> Self {
        Self { signers, quorum }
    }

    pub fn signers(&self) -> &[Address] {
        &self.signers
    }

    pub fn quorum(&self) -> u32 {
        self.quorum
    }

    pub fn len(&self) -> usize {
        self.signers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signers.is_empty()
    }

    pub fn contains(&self, who: &Address) -> bool {
        self.signers.iter().any(|s| s == who)
    }

    /// Whether one more removal would still leave `quorum` signers
    pub fn can_shrink(&self) -> bool {
        self.signers.len() > self.quorum as usize
    }

    pub(crate) fn add(&mut self, who: Address) -> Result<(), MultisigError> {
        if self.contains(&who) {
            return Err(MultisigError::DuplicateSigner(who));
        }
        self.signers.push(who);
        Ok(())
    }

    /// Remove `who`, keeping the order of the rest
    pub(crate) fn remove(&mut self, who: &Address) -> Result<(), MultisigError> {
        let index = self
            .signers
            .iter()
            .position(|s| s == who)
            .ok_or_else(|| MultisigError::SignerNotFound(who.clone()))?;
        if !self.can_shrink() {
            return Err(MultisigError::QuorumFloorViolation {
                quorum: self.quorum,
                signers: self.signers.len() - 1,
            });
        }
        self.signers.remove(index);
        Ok(())
    }

    pub(crate) fn set_quorum(&mut self, quorum: u32) -> Result<(), MultisigError> {
        if quorum == 0 || quorum as usize > self.signers.len() {
            return Err(MultisigError::QuorumFloorViolation {
                quorum,
                signers: self.signers.len(),
            });
        }
        self.quorum = quorum;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(names: &[&str], quorum: u32) -> SignerRegistry {
        SignerRegistry::new(names.iter().map(|n| Address::from(*n)).collect(), quorum)
    }

    #[test]
    fn test_add_preserves_order() {
        let mut reg = registry(&["owner", "admin", "vault"], 2);
        reg.add(Address::from("user1")).unwrap();

        let names: Vec<&str> = reg.signers().iter().map(|s| s.as_str()).collect();
        assert_eq!(names, ["owner", "admin", "vault", "user1"]);
    }

    #[test]
    fn test_add_duplicate() {
        let mut reg = registry(&["owner", "admin"], 1);
        assert_eq!(
            reg.add(Address::from("admin")),
            Err(MultisigError::DuplicateSigner(Address::from("admin")))
        );
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_remove_keeps_relative_order() {
        let mut reg = registry(&["a", "b", "c", "d"], 2);
        reg.remove(&Address::from("b")).unwrap();

        let names: Vec<&str> = reg.signers().iter().map(|s| s.as_str()).collect();
        assert_eq!(names, ["a", "c", "d"]);
    }

    #[test]
    fn test_remove_respects_quorum_floor() {
        let mut reg = registry(&["a", "b"], 2);
        assert!(!reg.can_shrink());
        assert!(matches!(
            reg.remove(&Address::from("a")),
            Err(MultisigError::QuorumFloorViolation { quorum: 2, signers: 1 })
        ));
        assert_eq!(reg.len(), 2);

        assert_eq!(
            reg.remove(&Address::from("zed")),
            Err(MultisigError::SignerNotFound(Address::from("zed")))
        );
    }

    #[test]
    fn test_set_quorum_bounds() {
        let mut reg = registry(&["a", "b", "c"], 2);
        reg.set_quorum(3).unwrap();
        assert_eq!(reg.quorum(), 3);

        assert!(reg.set_quorum(0).is_err());
        assert!(reg.set_quorum(4).is_err());
        assert_eq!(reg.quorum(), 3);
    }
}
