//! Observable wallet events and per-call receipts

use crate::core::Address;
use crate::multisig::request::TxId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why an owner's signer removal was refused
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum RemovalRefusal {
    /// The remaining signers could not meet the quorum
    BelowQuorum,
    /// Some request is neither executed nor cancelled
    PendingRequest,
}

impl RemovalRefusal {
    pub fn reason(self) -> &'static str {
        match self {
            RemovalRefusal::BelowQuorum => "cannot meet no of min signs.",
            RemovalRefusal::PendingRequest => "pending TX exists.",
        }
    }
}

impl fmt::Display for RemovalRefusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

/// Everything the wallet reports to observers
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum WalletEvent {
    #[serde(rename = "TXRequested")]
    TxRequested { id: TxId, proposer: Address },
    #[serde(rename = "TXSigned")]
    TxSigned { id: TxId, signer: Address },
    #[serde(rename = "TXRejected")]
    TxRejected { id: TxId, signer: Address },
    #[serde(rename = "TXQuorumUnreachable")]
    TxQuorumUnreachable { id: TxId },
    #[serde(rename = "TXExecuted")]
    TxExecuted { id: TxId },
    #[serde(rename = "TXExecutionFailed")]
    TxExecutionFailed { id: TxId },
    #[serde(rename = "TXCancelled")]
    TxCancelled { id: TxId, by: Address },
    SignerAdded { who: Address },
    SignerRemoved { who: Address },
    SignerCannotRemoved {
        who: Address,
        reason: RemovalRefusal,
    },
    QuorumChanged { old: u32, new: u32 },
    GovernedAssetChanged { old: Address, new: Address },
    PrincipalRefunded { to: Address, amount: u128 },
}

impl fmt::Display for WalletEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletEvent::TxRequested { id, proposer } => {
                write!(f, "TXRequested(id={}, proposer={})", id, proposer)
            }
            WalletEvent::TxSigned { id, signer } => write!(f, "TXSigned(id={}, by={})", id, signer),
            WalletEvent::TxRejected { id, signer } => {
                write!(f, "TXRejected(id={}, by={})", id, signer)
            }
            WalletEvent::TxQuorumUnreachable { id } => write!(f, "TXQuorumUnreachable(id={})", id),
            WalletEvent::TxExecuted { id } => write!(f, "TXExecuted(id={})", id),
            WalletEvent::TxExecutionFailed { id } => write!(f, "TXExecutionFailed(id={})", id),
            WalletEvent::TxCancelled { id, by } => write!(f, "TXCancelled(id={}, by={})", id, by),
            WalletEvent::SignerAdded { who } => write!(f, "SignerAdded({})", who),
            WalletEvent::SignerRemoved { who } => write!(f, "SignerRemoved({})", who),
            WalletEvent::SignerCannotRemoved { who, reason } => {
                write!(f, "SignerCannotRemoved({}, \"{}\")", who, reason)
            }
            WalletEvent::QuorumChanged { old, new } => write!(f, "QuorumChanged({} -> {})", old, new),
            WalletEvent::GovernedAssetChanged { old, new } => {
                write!(f, "GovernedAssetChanged({} -> {})", old, new)
            }
            WalletEvent::PrincipalRefunded { to, amount } => {
                write!(f, "PrincipalRefunded(to={}, amount={})", to, amount)
            }
        }
    }
}

/// Events emitted by one successful wallet call, in emission order
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Receipt {
    pub events: Vec<WalletEvent>,
}

impl Receipt {
    pub(crate) fn push(&mut self, event: WalletEvent) {
        self.events.push(event);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Id carried by the `TXRequested` event, if any
    pub fn requested_id(&self) -> Option<TxId> {
        self.events.iter().find_map(|e| match e {
            WalletEvent::TxRequested { id, .. } => Some(*id),
            _ => None,
        })
    }

    pub fn executed(&self, id: TxId) -> bool {
        self.events.contains(&WalletEvent::TxExecuted { id })
    }

    pub fn execution_failed(&self, id: TxId) -> bool {
        self.events.contains(&WalletEvent::TxExecutionFailed { id })
    }

    /// The refusal carried by a `SignerCannotRemoved` event, if any
    pub fn removal_refusal(&self) -> Option<(&Address, RemovalRefusal)> {
        self.events.iter().find_map(|e| match e {
            WalletEvent::SignerCannotRemoved { who, reason } => Some((who, *reason)),
            _ => None,
        })
    }
}
