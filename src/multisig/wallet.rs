//! Quorum-gated multi-signature wallet
//!
//! The wallet is the single owner of its signer registry and request store.
//! Every mutation goes through one of its methods, each of which either
//! returns a [`Receipt`] of the events it emitted or fails without changing
//! anything.

use crate::core::{Address, Clock, FOREVER};
use crate::crypto::{base58check, hash160};
use crate::dispatch::{Call, DispatchError, Dispatcher};
use crate::multisig::call::WalletCall;
use crate::multisig::config::WalletConfig;
use crate::multisig::error::MultisigError;
use crate::multisig::events::{Receipt, RemovalRefusal, WalletEvent};
use crate::multisig::request::{Proposal, QuorumOutlook, TransactionRequest, TxId};
use crate::multisig::signers::SignerRegistry;
use crate::multisig::store::RequestStore;
use serde::{Deserialize, Serialize};

/// Everything a wallet persists between calls
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WalletState {
    address: Address,
    owner: Address,
    governed_asset: Address,
    registry: SignerRegistry,
    store: RequestStore,
    /// Every event emitted by a successful call, oldest first
    history: Vec<WalletEvent>,
}

impl WalletState {
    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    pub fn governed_asset(&self) -> &Address {
        &self.governed_asset
    }

    pub fn registry(&self) -> &SignerRegistry {
        &self.registry
    }

    pub fn store(&self) -> &RequestStore {
        &self.store
    }

    pub fn history(&self) -> &[WalletEvent] {
        &self.history
    }
}

/// A multisig wallet running against host `H`
pub struct MultisigWallet<H> {
    state: WalletState,
    host: H,
}

/// P2SH-style address: Base58Check(0x05 || HASH160(quorum || owner || sorted signers))
fn derive_wallet_address(owner: &Address, config: &WalletConfig) -> Address {
    let mut sorted_signers = config.signers.clone();
    sorted_signers.sort();

    let mut script_data = config.quorum.to_be_bytes().to_vec();
    script_data.extend_from_slice(owner.as_str().as_bytes());
    for signer in &sorted_signers {
        script_data.push(0);
        script_data.extend_from_slice(signer.as_str().as_bytes());
    }

    Address::new(base58check(0x05, &hash160(&script_data)))
}

/// Expiry is checked first, so an expired request reports `Expired` whatever its state
fn ensure_votable(request: &TransactionRequest, now: u64) -> Result<(), MultisigError> {
    if request.is_expired(now) {
        return Err(MultisigError::Expired {
            id: request.id,
            expiry: request.expiry,
        });
    }
    if !request.is_open() {
        return Err(MultisigError::AlreadyFinal(request.id));
    }
    Ok(())
}

impl<H: Dispatcher + Clock> MultisigWallet<H> {
    /// Deploy a wallet owned by `owner`
    pub fn new(owner: Address, config: WalletConfig, host: H) -> Result<Self, MultisigError> {
        config.validate()?;
        let address = derive_wallet_address(&owner, &config);

        log::info!(
            "Multisig wallet {} deployed by {} ({}, governing {})",
            address,
            owner,
            config.description(),
            config.governed_asset
        );

        Ok(Self {
            state: WalletState {
                address,
                owner,
                governed_asset: config.governed_asset,
                registry: SignerRegistry::new(config.signers, config.quorum),
                store: RequestStore::new(),
                history: Vec::new(),
            },
            host,
        })
    }

    /// Reattach persisted state to a host
    pub fn from_parts(state: WalletState, host: H) -> Self {
        Self { state, host }
    }

    pub fn into_parts(self) -> (WalletState, H) {
        (self.state, self.host)
    }

    pub fn state(&self) -> &WalletState {
        &self.state
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn address(&self) -> &Address {
        &self.state.address
    }

    pub fn owner(&self) -> &Address {
        &self.state.owner
    }

    /// The token contract requests target by default (`playcoinAddr`)
    pub fn governed_asset(&self) -> &Address {
        &self.state.governed_asset
    }

    pub fn quorum(&self) -> u32 {
        self.state.registry.quorum()
    }

    pub fn history(&self) -> &[WalletEvent] {
        &self.state.history
    }

    pub fn is_signer(&self, who: &Address) -> bool {
        self.state.registry.contains(who)
    }

    // =========================================================================
    // Access control
    // =========================================================================

    fn require_signer(&self, caller: &Address) -> Result<(), MultisigError> {
        if !self.is_signer(caller) {
            return Err(MultisigError::Unauthorized(caller.clone()));
        }
        Ok(())
    }

    fn require_owner(&self, caller: &Address) -> Result<(), MultisigError> {
        if caller != &self.state.owner {
            return Err(MultisigError::Unauthorized(caller.clone()));
        }
        Ok(())
    }

    /// Signers and the owner may read wallet state
    fn require_reader(&self, caller: &Address) -> Result<(), MultisigError> {
        if caller != &self.state.owner && !self.is_signer(caller) {
            return Err(MultisigError::Unauthorized(caller.clone()));
        }
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn get_signers(&self, caller: &Address) -> Result<&[Address], MultisigError> {
        self.require_reader(caller)?;
        Ok(self.state.registry.signers())
    }

    pub fn view_tx(&self, caller: &Address, id: TxId) -> Result<&TransactionRequest, MultisigError> {
        self.require_reader(caller)?;
        self.state.store.get(id)
    }

    pub fn view_who_sign_tx(&self, caller: &Address, id: TxId) -> Result<&[Address], MultisigError> {
        Ok(self.view_tx(caller, id)?.signed_by())
    }

    pub fn view_who_reject_tx(
        &self,
        caller: &Address,
        id: TxId,
    ) -> Result<&[Address], MultisigError> {
        Ok(self.view_tx(caller, id)?.rejected_by())
    }

    /// Whether request `id` can still reach quorum from signers who have not rejected it
    pub fn quorum_outlook(&self, caller: &Address, id: TxId) -> Result<QuorumOutlook, MultisigError> {
        let request = self.view_tx(caller, id)?;
        Ok(request.outlook(self.state.registry.signers(), self.quorum()))
    }

    /// All requests in id order
    pub fn list_tx(&self, caller: &Address) -> Result<Vec<&TransactionRequest>, MultisigError> {
        self.require_reader(caller)?;
        Ok(self.state.store.iter().collect())
    }

    // =========================================================================
    // Request lifecycle
    // =========================================================================

    /// Propose `call_data` against the governed asset
    pub fn request_tx(
        &mut self,
        caller: &Address,
        call_data: Vec<u8>,
        description: &str,
    ) -> Result<Receipt, MultisigError> {
        self.submit(caller, Proposal::new(call_data, description))
    }

    /// Propose `call_data` against an explicit target
    pub fn request_tx_with_contract(
        &mut self,
        caller: &Address,
        target: Address,
        call_data: Vec<u8>,
        description: &str,
    ) -> Result<Receipt, MultisigError> {
        self.submit(caller, Proposal::new(call_data, description).target(target))
    }

    /// Open a new request. The proposer's submission is its first confirmation,
    /// so with a quorum of one it executes immediately.
    pub fn submit(&mut self, caller: &Address, proposal: Proposal) -> Result<Receipt, MultisigError> {
        self.require_signer(caller)?;

        let now = self.host.now();
        let expiry = proposal.expiry.unwrap_or(FOREVER);
        if expiry <= now {
            return Err(MultisigError::InvalidExpiry { expiry, now });
        }

        let target = proposal
            .target
            .unwrap_or_else(|| self.state.governed_asset.clone());
        let id = self.state.store.next_id();
        let mut request = TransactionRequest::new(
            id,
            caller.clone(),
            proposal.description,
            target,
            proposal.call_data,
            expiry,
            now,
        );
        request.confirmed = request.signature_count() >= self.quorum() as usize;
        let confirmed = request.confirmed;
        self.state.store.insert(request);

        log::info!("Transaction request {} submitted by {}", id, caller);

        let mut receipt = Receipt::default();
        receipt.push(WalletEvent::TxRequested {
            id,
            proposer: caller.clone(),
        });
        if confirmed {
            self.execute(id, &mut receipt)?;
        }

        Ok(self.commit(receipt))
    }

    /// Confirm request `id`. Any signature that leaves the request at or above
    /// quorum dispatches the call right away; a failed dispatch leaves the
    /// request confirmed for a later signature or `run_confirmed_tx`.
    pub fn sign_tx(&mut self, caller: &Address, id: TxId) -> Result<Receipt, MultisigError> {
        self.require_signer(caller)?;

        let now = self.host.now();
        let quorum = self.quorum() as usize;
        let request = self.state.store.get_mut(id)?;
        ensure_votable(request, now)?;
        if request.has_signed(caller) {
            return Err(MultisigError::AlreadySigned {
                id,
                signer: caller.clone(),
            });
        }

        if request.record_signature(caller) {
            log::debug!("{} withdrew rejection of request {}", caller, id);
        }
        let reached = request.signature_count() >= quorum;
        if reached && !request.confirmed {
            request.confirmed = true;
            log::info!("Transaction request {} reached quorum", id);
        }

        let mut receipt = Receipt::default();
        receipt.push(WalletEvent::TxSigned {
            id,
            signer: caller.clone(),
        });
        if reached {
            self.execute(id, &mut receipt)?;
        }

        Ok(self.commit(receipt))
    }

    /// Record a rejection of request `id`.
    ///
    /// Rejections are advisory: they never cancel a request. A signer who has
    /// confirmed cannot reject; a signer who rejected may later confirm.
    pub fn reject_tx(&mut self, caller: &Address, id: TxId) -> Result<Receipt, MultisigError> {
        self.require_signer(caller)?;

        let now = self.host.now();
        let quorum = self.state.registry.quorum();
        let signers = self.state.registry.signers();
        let request = self.state.store.get_mut(id)?;
        ensure_votable(request, now)?;
        if request.has_rejected(caller) {
            return Err(MultisigError::AlreadyRejected {
                id,
                signer: caller.clone(),
            });
        }
        if request.has_signed(caller) {
            return Err(MultisigError::AlreadySigned {
                id,
                signer: caller.clone(),
            });
        }

        request.record_rejection(caller);
        let outlook = request.outlook(signers, quorum);
        log::debug!("{} rejected request {}", caller, id);

        let mut receipt = Receipt::default();
        receipt.push(WalletEvent::TxRejected {
            id,
            signer: caller.clone(),
        });
        if !outlook.reachable {
            log::warn!(
                "Transaction request {} can no longer reach quorum ({} signed, {} undecided, {} needed)",
                id,
                outlook.signed,
                outlook.undecided,
                outlook.quorum
            );
            receipt.push(WalletEvent::TxQuorumUnreachable { id });
        }

        Ok(self.commit(receipt))
    }

    /// Retry dispatch of a confirmed request whose earlier attempt failed
    pub fn run_confirmed_tx(&mut self, caller: &Address, id: TxId) -> Result<Receipt, MultisigError> {
        self.require_signer(caller)?;

        let now = self.host.now();
        let request = self.state.store.get(id)?;
        if request.cancelled {
            return Err(MultisigError::AlreadyCancelled(id));
        }
        if request.executed {
            return Err(MultisigError::AlreadyExecuted(id));
        }
        if !request.confirmed {
            return Err(MultisigError::NotConfirmed(id));
        }
        if request.is_expired(now) {
            return Err(MultisigError::Expired {
                id,
                expiry: request.expiry,
            });
        }

        let mut receipt = Receipt::default();
        self.execute(id, &mut receipt)?;
        Ok(self.commit(receipt))
    }

    /// Withdraw pending request `id`. Only its proposer or the owner may do so.
    pub fn cancel_tx(&mut self, caller: &Address, id: TxId) -> Result<Receipt, MultisigError> {
        let owner = &self.state.owner;
        let request = self.state.store.get_mut(id)?;
        if caller != &request.proposer && caller != owner {
            return Err(MultisigError::Unauthorized(caller.clone()));
        }
        if request.executed {
            return Err(MultisigError::AlreadyExecuted(id));
        }
        if request.cancelled {
            return Err(MultisigError::AlreadyCancelled(id));
        }
        if request.confirmed {
            return Err(MultisigError::NotPending(id));
        }

        request.cancelled = true;
        log::info!("Transaction request {} cancelled by {}", id, caller);

        let mut receipt = Receipt::default();
        receipt.push(WalletEvent::TxCancelled {
            id,
            by: caller.clone(),
        });
        Ok(self.commit(receipt))
    }

    // =========================================================================
    // Administration
    // =========================================================================

    pub fn add_signer(&mut self, caller: &Address, who: Address) -> Result<Receipt, MultisigError> {
        self.require_owner(caller)?;
        self.state.registry.add(who.clone())?;

        log::info!("Signer {} added", who);

        let mut receipt = Receipt::default();
        receipt.push(WalletEvent::SignerAdded { who });
        Ok(self.commit(receipt))
    }

    /// Remove signer `who`.
    ///
    /// Removal is refused, with a `SignerCannotRemoved` event rather than an
    /// error, when the remaining signers could not meet the quorum or while
    /// any request is still open.
    pub fn remove_signer(&mut self, caller: &Address, who: &Address) -> Result<Receipt, MultisigError> {
        self.require_owner(caller)?;
        if !self.state.registry.contains(who) {
            return Err(MultisigError::SignerNotFound(who.clone()));
        }

        let refusal = if !self.state.registry.can_shrink() {
            Some(RemovalRefusal::BelowQuorum)
        } else if self.state.store.has_open() {
            Some(RemovalRefusal::PendingRequest)
        } else {
            None
        };

        let mut receipt = Receipt::default();
        match refusal {
            Some(reason) => {
                log::warn!("Signer {} cannot be removed: {}", who, reason);
                receipt.push(WalletEvent::SignerCannotRemoved {
                    who: who.clone(),
                    reason,
                });
            }
            None => {
                self.state.registry.remove(who)?;
                log::info!("Signer {} removed", who);
                receipt.push(WalletEvent::SignerRemoved { who: who.clone() });
            }
        }
        Ok(self.commit(receipt))
    }

    /// Change the quorum threshold. Votes already cast keep counting: open
    /// requests that already meet a lowered quorum become confirmed, and
    /// those not yet expired are dispatched.
    pub fn set_quorum(&mut self, caller: &Address, quorum: u32) -> Result<Receipt, MultisigError> {
        self.require_owner(caller)?;
        let old = self.state.registry.quorum();
        self.state.registry.set_quorum(quorum)?;

        log::info!("Quorum changed from {} to {}", old, quorum);

        let mut receipt = Receipt::default();
        receipt.push(WalletEvent::QuorumChanged { old, new: quorum });

        let now = self.host.now();
        let ready: Vec<(TxId, bool)> = self
            .state
            .store
            .open()
            .filter(|r| !r.confirmed && r.signature_count() >= quorum as usize)
            .map(|r| (r.id, r.is_expired(now)))
            .collect();
        for (id, expired) in ready {
            self.state.store.get_mut(id)?.confirmed = true;
            log::info!("Transaction request {} reached quorum", id);
            if !expired {
                self.execute(id, &mut receipt)?;
            }
        }

        Ok(self.commit(receipt))
    }

    /// Point new requests at a different token contract.
    /// Existing requests keep the target they were created with.
    pub fn set_governed_asset(
        &mut self,
        caller: &Address,
        new: Address,
    ) -> Result<Receipt, MultisigError> {
        self.require_owner(caller)?;
        let old = std::mem::replace(&mut self.state.governed_asset, new.clone());

        log::info!("Governed asset changed from {} to {}", old, new);

        let mut receipt = Receipt::default();
        receipt.push(WalletEvent::GovernedAssetChanged { old, new });
        Ok(self.commit(receipt))
    }

    /// Send native value held by the wallet to `to`.
    ///
    /// Only the wallet itself may call this, which happens when a confirmed
    /// request targeting the wallet carries an encoded
    /// [`WalletCall::RefundPrincipal`].
    pub fn refund_principal(
        &mut self,
        caller: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<Receipt, MultisigError> {
        let mut receipt = Receipt::default();
        self.refund_as(caller, to, amount, &mut receipt)?;
        Ok(self.commit(receipt))
    }

    fn refund_as(
        &mut self,
        caller: &Address,
        to: &Address,
        amount: u128,
        receipt: &mut Receipt,
    ) -> Result<(), MultisigError> {
        if caller != &self.state.address {
            return Err(MultisigError::Forbidden("refund_principal"));
        }
        self.host
            .dispatch(&self.state.address, &Call::transfer_value(to.clone(), amount))?;

        log::info!("Refunded {} native to {}", amount, to);
        receipt.push(WalletEvent::PrincipalRefunded {
            to: to.clone(),
            amount,
        });
        Ok(())
    }

    // =========================================================================
    // Execution
    // =========================================================================

    /// Dispatch a confirmed, open request. Shared by the auto-execute path in
    /// `submit`/`sign_tx` and by `run_confirmed_tx`.
    ///
    /// A failed dispatch is not an error of the enclosing call: it is
    /// reported as `TXExecutionFailed` and the request stays confirmed.
    fn execute(&mut self, id: TxId, receipt: &mut Receipt) -> Result<(), MultisigError> {
        let request = self.state.store.get(id)?;
        if !request.confirmed || !request.is_open() {
            return Ok(());
        }
        let call = request.call();

        let mut effects = Receipt::default();
        match self.invoke(&call, &mut effects) {
            Ok(()) => {
                self.state.store.get_mut(id)?.executed = true;
                log::info!("Transaction request {} executed against {}", id, call.target);
                receipt.events.append(&mut effects.events);
                receipt.push(WalletEvent::TxExecuted { id });
            }
            Err(e) => {
                log::warn!("Execution of transaction request {} failed: {}", id, e);
                receipt.push(WalletEvent::TxExecutionFailed { id });
            }
        }
        Ok(())
    }

    /// Route `call` either back into the wallet or out to the host
    fn invoke(&mut self, call: &Call, effects: &mut Receipt) -> Result<(), MultisigError> {
        if call.target != self.state.address {
            self.host.dispatch(&self.state.address, call)?;
            return Ok(());
        }

        let wallet_call = WalletCall::decode(&call.data).map_err(DispatchError::from)?;
        match wallet_call {
            WalletCall::RefundPrincipal { to, amount } => {
                let wallet = self.state.address.clone();
                self.refund_as(&wallet, &to, amount, effects)
            }
        }
    }

    fn commit(&mut self, receipt: Receipt) -> Receipt {
        self.state.history.extend(receipt.events.iter().cloned());
        receipt
    }
}
