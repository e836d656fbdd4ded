//! Request records keyed by id

use crate::multisig::error::MultisigError;
use crate::multisig::request::{TransactionRequest, TxId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Owns every request ever created. Nothing is garbage collected.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequestStore {
    next_id: TxId,
    requests: BTreeMap<TxId, TransactionRequest>,
}

impl RequestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The id the next insert will receive
    pub fn next_id(&self) -> TxId {
        self.next_id
    }

    /// Store a request built for `next_id()` and advance the counter
    pub(crate) fn insert(&mut self, request: TransactionRequest) -> TxId {
        let id = self.next_id;
        debug_assert_eq!(request.id, id);
        self.requests.insert(id, request);
        self.next_id += 1;
        id
    }

    pub fn get(&self, id: TxId) -> Result<&TransactionRequest, MultisigError> {
        self.requests.get(&id).ok_or(MultisigError::NotFound(id))
    }

    pub(crate) fn get_mut(&mut self, id: TxId) -> Result<&mut TransactionRequest, MultisigError> {
        self.requests.get_mut(&id).ok_or(MultisigError::NotFound(id))
    }

    /// All requests in id order
    pub fn iter(&self) -> impl Iterator<Item = &TransactionRequest> {
        self.requests.values()
    }

    /// Requests neither executed nor cancelled
    pub fn open(&self) -> impl Iterator<Item = &TransactionRequest> {
        self.requests.values().filter(|r| r.is_open())
    }

    pub fn has_open(&self) -> bool {
        self.open().next().is_some()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Address, FOREVER};

    fn build(store: &RequestStore) -> TransactionRequest {
        TransactionRequest::new(
            store.next_id(),
            Address::from("vault"),
            "test".to_string(),
            Address::from("0xcoin"),
            vec![],
            FOREVER,
            0,
        )
    }

    #[test]
    fn test_ids_are_monotonic() {
        let mut store = RequestStore::new();
        let a = store.insert(build(&store));
        let b = store.insert(build(&store));

        assert_eq!((a, b), (0, 1));
        assert_eq!(store.next_id(), 2);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_cancelled_ids_not_reused() {
        let mut store = RequestStore::new();
        let id = store.insert(build(&store));
        store.get_mut(id).unwrap().cancelled = true;

        assert!(!store.has_open());
        assert_eq!(store.insert(build(&store)), 1);
        assert!(store.has_open());
    }

    #[test]
    fn test_unknown_id() {
        let store = RequestStore::new();
        assert_eq!(store.get(7).unwrap_err(), MultisigError::NotFound(7));
    }
}
