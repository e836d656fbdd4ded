//! Transaction requests and their vote ledgers

use crate::core::{Address, FOREVER};
use crate::dispatch::{abi::hex_bytes, Call};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Request identifier; allocated in increasing order, never reused
pub type TxId = u64;

/// Where a request is in its lifecycle
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum RequestStatus {
    /// Collecting confirmations
    Pending,
    /// Reached quorum, dispatch not yet successful
    Confirmed,
    Executed,
    Cancelled,
}

impl RequestStatus {
    pub fn is_final(self) -> bool {
        matches!(self, RequestStatus::Executed | RequestStatus::Cancelled)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Confirmed => "confirmed",
            RequestStatus::Executed => "executed",
            RequestStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// What a signer submits to open a request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Proposal {
    pub description: String,
    pub call_data: Vec<u8>,
    /// Defaults to the governed asset
    pub target: Option<Address>,
    /// Defaults to [`FOREVER`]
    pub expiry: Option<u64>,
}

impl Proposal {
    pub fn new(call_data: Vec<u8>, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            call_data,
            target: None,
            expiry: None,
        }
    }

    pub fn target(mut self, target: Address) -> Self {
        self.target = Some(target);
        self
    }

    pub fn expiry(mut self, expiry: u64) -> Self {
        self.expiry = Some(expiry);
        self
    }
}

/// A proposed call and the votes cast on it
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionRequest {
    pub id: TxId,
    pub description: String,
    pub target: Address,
    #[serde(with = "hex_bytes")]
    pub call_data: Vec<u8>,
    pub proposer: Address,
    pub executed: bool,
    pub cancelled: bool,
    pub confirmed: bool,
    pub expiry: u64,
    pub created_at: u64,
    signed_by: Vec<Address>,
    rejected_by: Vec<Address>,
}

impl TransactionRequest {
    /// A fresh request; the proposer's submission is its first confirmation
    pub(crate) fn new(
        id: TxId,
        proposer: Address,
        description: String,
        target: Address,
        call_data: Vec<u8>,
        expiry: u64,
        created_at: u64,
    ) -> Self {
        Self {
            id,
            description,
            target,
            call_data,
            signed_by: vec![proposer.clone()],
            proposer,
            executed: false,
            cancelled: false,
            confirmed: false,
            expiry,
            created_at,
            rejected_by: Vec::new(),
        }
    }

    pub fn status(&self) -> RequestStatus {
        if self.cancelled {
            RequestStatus::Cancelled
        } else if self.executed {
            RequestStatus::Executed
        } else if self.confirmed {
            RequestStatus::Confirmed
        } else {
            RequestStatus::Pending
        }
    }

    /// Not executed and not cancelled
    pub fn is_open(&self) -> bool {
        !self.status().is_final()
    }

    pub fn is_expired(&self, now: u64) -> bool {
        now > self.expiry
    }

    pub fn never_expires(&self) -> bool {
        self.expiry == FOREVER
    }

    pub fn signed_by(&self) -> &[Address] {
        &self.signed_by
    }

    pub fn rejected_by(&self) -> &[Address] {
        &self.rejected_by
    }

    pub fn has_signed(&self, who: &Address) -> bool {
        self.signed_by.contains(who)
    }

    pub fn has_rejected(&self, who: &Address) -> bool {
        self.rejected_by.contains(who)
    }

    pub fn signature_count(&self) -> usize {
        self.signed_by.len()
    }

    /// The call this request dispatches once confirmed
    pub fn call(&self) -> Call {
        Call::new(self.target.clone(), self.call_data.clone())
    }

    /// Record a confirmation, withdrawing an earlier rejection by the same signer.
    /// Returns whether a rejection was withdrawn.
    pub(crate) fn record_signature(&mut self, who: &Address) -> bool {
        debug_assert!(!self.has_signed(who));
        self.signed_by.push(who.clone());
        match self.rejected_by.iter().position(|r| r == who) {
            Some(index) => {
                self.rejected_by.remove(index);
                true
            }
            None => false,
        }
    }

    pub(crate) fn record_rejection(&mut self, who: &Address) {
        debug_assert!(!self.has_signed(who) && !self.has_rejected(who));
        self.rejected_by.push(who.clone());
    }

    /// Tally against the current signer set and threshold
    pub fn outlook(&self, signers: &[Address], quorum: u32) -> QuorumOutlook {
        let undecided = signers
            .iter()
            .filter(|s| !self.has_signed(s) && !self.has_rejected(s))
            .count();
        let signed = self.signed_by.len();

        QuorumOutlook {
            signed,
            rejected: self.rejected_by.len(),
            undecided,
            quorum,
            reachable: self.confirmed || signed + undecided >= quorum as usize,
        }
    }
}

/// Whether a request can still gather a quorum. Advisory only; the wallet
/// never aborts a request because of it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuorumOutlook {
    pub signed: usize,
    pub rejected: usize,
    /// Current signers who have neither signed nor rejected
    pub undecided: usize,
    pub quorum: u32,
    pub reachable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> Address {
        Address::from(s)
    }

    fn request() -> TransactionRequest {
        TransactionRequest::new(
            0,
            addr("vault"),
            "send 1PLY to user1".to_string(),
            addr("0xcoin"),
            vec![1, 2, 3],
            FOREVER,
            1_000,
        )
    }

    #[test]
    fn test_new_request_counts_proposer() {
        let req = request();

        assert_eq!(req.signed_by(), [addr("vault")]);
        assert!(req.rejected_by().is_empty());
        assert_eq!(req.status(), RequestStatus::Pending);
        assert!(req.is_open());
        assert!(req.never_expires());
    }

    #[test]
    fn test_status_precedence() {
        let mut req = request();
        req.confirmed = true;
        assert_eq!(req.status(), RequestStatus::Confirmed);

        req.executed = true;
        assert_eq!(req.status(), RequestStatus::Executed);
        assert!(!req.is_open());

        let mut req = request();
        req.cancelled = true;
        assert_eq!(req.status(), RequestStatus::Cancelled);
    }

    #[test]
    fn test_signature_withdraws_rejection() {
        let mut req = request();
        req.record_rejection(&addr("admin"));
        assert!(req.has_rejected(&addr("admin")));

        assert!(req.record_signature(&addr("admin")));
        assert_eq!(req.signed_by(), [addr("vault"), addr("admin")]);
        assert!(req.rejected_by().is_empty());

        assert!(!req.record_signature(&addr("owner")));
    }

    #[test]
    fn test_expiry_is_exclusive() {
        let mut req = request();
        req.expiry = 2_000;
        assert!(!req.is_expired(2_000));
        assert!(req.is_expired(2_001));
    }

    #[test]
    fn test_outlook() {
        let signers = [addr("owner"), addr("admin"), addr("vault")];
        let mut req = request();

        let outlook = req.outlook(&signers, 3);
        assert_eq!(outlook.undecided, 2);
        assert!(outlook.reachable);

        req.record_rejection(&addr("admin"));
        let outlook = req.outlook(&signers, 3);
        assert_eq!(outlook.rejected, 1);
        assert_eq!(outlook.undecided, 1);
        assert!(!outlook.reachable);

        // Still reachable at a lower threshold
        assert!(req.outlook(&signers, 2).reachable);
    }

    #[test]
    fn test_proposal_builder() {
        let p = Proposal::new(vec![9], "refund")
            .target(addr("wallet"))
            .expiry(5_000);
        assert_eq!(p.target, Some(addr("wallet")));
        assert_eq!(p.expiry, Some(5_000));
    }
}
