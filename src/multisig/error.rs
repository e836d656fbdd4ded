//! Errors that abort a wallet call

use crate::core::Address;
use crate::dispatch::DispatchError;
use crate::multisig::request::TxId;
use thiserror::Error;

/// A failed wallet call. The wallet state is unchanged whenever one of these
/// is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MultisigError {
    #[error("Unauthorized: {0} lacks the required role")]
    Unauthorized(Address),
    #[error("Forbidden: {0} may only be invoked through a confirmed request")]
    Forbidden(&'static str),
    #[error("Transaction request not found: {0}")]
    NotFound(TxId),
    #[error("Transaction request {0} is already executed or cancelled")]
    AlreadyFinal(TxId),
    #[error("Transaction request {0} is already executed")]
    AlreadyExecuted(TxId),
    #[error("Transaction request {0} is already cancelled")]
    AlreadyCancelled(TxId),
    #[error("Transaction request {0} has not reached quorum")]
    NotConfirmed(TxId),
    #[error("Transaction request {0} is confirmed and can no longer be cancelled")]
    NotPending(TxId),
    #[error("{signer} already signed transaction request {id}")]
    AlreadySigned { id: TxId, signer: Address },
    #[error("{signer} already rejected transaction request {id}")]
    AlreadyRejected { id: TxId, signer: Address },
    #[error("Transaction request {id} expired at {expiry}")]
    Expired { id: TxId, expiry: u64 },
    #[error("Invalid expiry {expiry}: must be later than {now}")]
    InvalidExpiry { expiry: u64, now: u64 },
    #[error("Duplicate signer: {0}")]
    DuplicateSigner(Address),
    #[error("Not a signer: {0}")]
    SignerNotFound(Address),
    #[error("Quorum {quorum} not satisfiable by {signers} signers")]
    QuorumFloorViolation { quorum: u32, signers: usize },
    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),
    #[error("Signer set must not be empty")]
    EmptySignerSet,
    #[error("Dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),
}
