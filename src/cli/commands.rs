//! CLI commands for the multisig wallet
//!
//! Every command loads the snapshot, applies one wallet call and saves the
//! result. Callers identify themselves with a hex private key.

use crate::core::Address;
use crate::crypto::KeyPair;
use crate::ledger::{LedgerConfig, LedgerHost};
use crate::multisig::{
    MultisigWallet, Proposal, Receipt, TransactionRequest, TxId, WalletCall, WalletConfig,
    WalletState,
};
use crate::storage::{Storage, StorageConfig};
use crate::token::TokenCall;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    wallet: &'a WalletState,
    ledger: &'a LedgerHost,
}

#[derive(Deserialize)]
struct Snapshot {
    wallet: WalletState,
    ledger: LedgerHost,
}

/// Application state
pub struct AppState {
    pub wallet: MultisigWallet<LedgerHost>,
    pub storage: Storage,
    pub data_dir: PathBuf,
}

fn open_storage(data_dir: &Path) -> CliResult<Storage> {
    let storage_config = StorageConfig {
        data_dir: data_dir.to_path_buf(),
        ..Default::default()
    };
    Ok(Storage::new(storage_config)?)
}

fn save_snapshot(storage: &Storage, wallet: &MultisigWallet<LedgerHost>) -> CliResult<()> {
    storage.save(&SnapshotRef {
        wallet: wallet.state(),
        ledger: wallet.host(),
    })?;
    Ok(())
}

impl AppState {
    /// Load the wallet persisted under `data_dir`
    pub fn new(data_dir: PathBuf) -> CliResult<Self> {
        let storage = open_storage(&data_dir)?;
        if !storage.exists() {
            return Err(format!(
                "No wallet found in {:?}. Create one with: multisig init",
                data_dir
            )
            .into());
        }

        let snapshot: Snapshot = storage.load()?;
        log::debug!("Loaded wallet {} from {:?}", snapshot.wallet.address(), data_dir);

        Ok(Self {
            wallet: MultisigWallet::from_parts(snapshot.wallet, snapshot.ledger),
            storage,
            data_dir,
        })
    }

    pub fn save(&self) -> CliResult<()> {
        save_snapshot(&self.storage, &self.wallet)
    }
}

/// Address controlled by a hex private key
fn caller(key: &str) -> CliResult<Address> {
    Ok(KeyPair::from_private_key_hex(key)?.address())
}

fn print_receipt(receipt: &Receipt) {
    for event in &receipt.events {
        println!("   📣 {}", event);
    }
}

fn print_request(request: &TransactionRequest) {
    println!("📄 Transaction request #{}", request.id);
    println!("   ├─ Description: {}", request.description);
    println!("   ├─ Target: {}", request.target);
    println!("   ├─ Call data: {}", hex::encode(&request.call_data));
    println!("   ├─ Proposer: {}", request.proposer);
    println!("   ├─ Status: {}", request.status());
    if request.never_expires() {
        println!("   ├─ Expiry: never");
    } else {
        println!("   ├─ Expiry: {}", format_time(request.expiry));
    }
    println!("   ├─ Created: {}", format_time(request.created_at));
    println!("   ├─ Signed by: {}", join(request.signed_by()));
    println!("   └─ Rejected by: {}", join(request.rejected_by()));
}

fn format_time(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|s| chrono::DateTime::from_timestamp(s, 0))
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| secs.to_string())
}

fn join(addresses: &[Address]) -> String {
    if addresses.is_empty() {
        return "-".to_string();
    }
    addresses
        .iter()
        .map(Address::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Generate a signer key
pub fn cmd_keygen() -> CliResult<()> {
    let key = KeyPair::generate();

    println!("🔐 New signer key generated!");
    println!("   📍 Address: {}", key.address());
    println!("   🔑 Public Key: {}", key.public_key_hex());
    println!("   🗝️  Private Key: {}", key.private_key_hex());
    println!("\n   ⚠️  IMPORTANT: Store the private key safely. It is not saved anywhere.");

    Ok(())
}

/// Parameters of `multisig init`
pub struct InitOptions {
    pub signers: Vec<String>,
    pub quorum: u32,
    pub token_name: String,
    pub token_symbol: String,
    pub decimals: u8,
    pub supply: u128,
    pub gas_fee: u128,
    pub force: bool,
}

/// Deploy the governed token and the wallet on a fresh ledger
pub fn cmd_init(data_dir: &Path, owner_key: &str, options: InitOptions) -> CliResult<()> {
    let storage = open_storage(data_dir)?;

    if storage.exists() && !options.force {
        println!("⚠️  A wallet already exists at {:?}", data_dir);
        println!("   Use --force to reinitialize (this will replace existing data)");
        return Ok(());
    }

    let owner = caller(owner_key)?;
    let mut ledger = LedgerHost::new(LedgerConfig {
        gas_fee: options.gas_fee,
    });
    let token = ledger.deploy_token(
        &options.token_name,
        &options.token_symbol,
        options.decimals,
        options.supply,
        &owner,
    )?;

    let signers = options.signers.into_iter().map(Address::from).collect();
    let config = WalletConfig::new(signers, options.quorum, token.address.clone())?;
    let description = config.description();
    let wallet = MultisigWallet::new(owner.clone(), config, ledger)?;

    save_snapshot(&storage, &wallet)?;

    println!("✅ Multisig wallet initialized!");
    println!("   📁 Data directory: {:?}", data_dir);
    println!("   📍 Wallet address: {}", wallet.address());
    println!("   👑 Owner: {}", owner);
    println!("   🔏 Policy: {}", description);
    println!(
        "   🪙 Governed asset: {} ({}), supply {} held by owner",
        token.address,
        token.symbol(),
        token.total_supply()
    );
    println!("   ⛽ Gas fee: {}", options.gas_fee);

    Ok(())
}

fn submit(state: &mut AppState, key: &str, proposal: Proposal) -> CliResult<()> {
    let who = caller(key)?;
    let receipt = state.wallet.submit(&who, proposal)?;
    state.save()?;

    if let Some(id) = receipt.requested_id() {
        println!("📝 Transaction request #{} submitted", id);
    }
    print_receipt(&receipt);
    Ok(())
}

fn proposal(data: Vec<u8>, description: &str, expiry: Option<u64>) -> Proposal {
    let proposal = Proposal::new(data, description);
    match expiry {
        Some(expiry) => proposal.expiry(expiry),
        None => proposal,
    }
}

/// Propose a governed-asset transfer out of the wallet
pub fn cmd_propose_transfer(
    state: &mut AppState,
    key: &str,
    to: &str,
    amount: u128,
    description: &str,
    expiry: Option<u64>,
) -> CliResult<()> {
    let data = TokenCall::Transfer {
        to: Address::from(to),
        amount,
    }
    .encode()?;
    submit(state, key, proposal(data, description, expiry))
}

/// Propose sending native value held by the wallet to `to`
pub fn cmd_propose_refund(
    state: &mut AppState,
    key: &str,
    to: &str,
    amount: u128,
    description: &str,
    expiry: Option<u64>,
) -> CliResult<()> {
    let data = WalletCall::RefundPrincipal {
        to: Address::from(to),
        amount,
    }
    .encode()?;
    let target = state.wallet.address().clone();
    submit(state, key, proposal(data, description, expiry).target(target))
}

/// Propose arbitrary hex call data
pub fn cmd_propose_raw(
    state: &mut AppState,
    key: &str,
    target: Option<&str>,
    data_hex: &str,
    description: &str,
    expiry: Option<u64>,
) -> CliResult<()> {
    let data = hex::decode(data_hex.trim_start_matches("0x"))?;
    let mut proposal = proposal(data, description, expiry);
    if let Some(target) = target {
        proposal = proposal.target(Address::from(target));
    }
    submit(state, key, proposal)
}

pub fn cmd_sign(state: &mut AppState, key: &str, id: TxId) -> CliResult<()> {
    let who = caller(key)?;
    let receipt = state.wallet.sign_tx(&who, id)?;
    state.save()?;

    println!("✍️  Request #{} signed by {}", id, who);
    print_receipt(&receipt);
    Ok(())
}

pub fn cmd_reject(state: &mut AppState, key: &str, id: TxId) -> CliResult<()> {
    let who = caller(key)?;
    let receipt = state.wallet.reject_tx(&who, id)?;
    state.save()?;

    println!("🚫 Request #{} rejected by {}", id, who);
    print_receipt(&receipt);
    Ok(())
}

/// Retry a confirmed request
pub fn cmd_run(state: &mut AppState, key: &str, id: TxId) -> CliResult<()> {
    let who = caller(key)?;
    let receipt = state.wallet.run_confirmed_tx(&who, id)?;
    state.save()?;

    if receipt.executed(id) {
        println!("✅ Request #{} executed", id);
    } else {
        println!("❌ Request #{} failed to execute; it stays confirmed", id);
    }
    print_receipt(&receipt);
    Ok(())
}

pub fn cmd_cancel(state: &mut AppState, key: &str, id: TxId) -> CliResult<()> {
    let who = caller(key)?;
    let receipt = state.wallet.cancel_tx(&who, id)?;
    state.save()?;

    println!("🗑️  Request #{} cancelled", id);
    print_receipt(&receipt);
    Ok(())
}

/// Show one request and its quorum outlook
pub fn cmd_show(state: &AppState, key: &str, id: TxId) -> CliResult<()> {
    let who = caller(key)?;
    let request = state.wallet.view_tx(&who, id)?;
    let outlook = state.wallet.quorum_outlook(&who, id)?;

    print_request(request);
    println!(
        "\n   🗳️  {} of {} confirmations, {} rejected, {} undecided{}",
        outlook.signed,
        outlook.quorum,
        outlook.rejected,
        outlook.undecided,
        if outlook.reachable { "" } else { " (quorum unreachable)" }
    );
    Ok(())
}

pub fn cmd_list(state: &AppState, key: &str) -> CliResult<()> {
    let who = caller(key)?;
    let requests = state.wallet.list_tx(&who)?;

    if requests.is_empty() {
        println!("📭 No transaction requests yet. Create one with: multisig propose");
        return Ok(());
    }

    println!("📋 Transaction requests:");
    for request in requests {
        println!(
            "   #{} | {:<9} | {} sig(s) | {}",
            request.id,
            request.status().to_string(),
            request.signature_count(),
            request.description
        );
    }
    Ok(())
}

pub fn cmd_signers(state: &AppState, key: &str) -> CliResult<()> {
    let who = caller(key)?;
    let signers = state.wallet.get_signers(&who)?;

    println!(
        "🔏 Signers ({}-of-{}):",
        state.wallet.quorum(),
        signers.len()
    );
    for signer in signers {
        let marker = if signer == state.wallet.owner() { " 👑" } else { "" };
        println!("   └─ {}{}", signer, marker);
    }
    Ok(())
}

pub fn cmd_add_signer(state: &mut AppState, key: &str, signer: &str) -> CliResult<()> {
    let who = caller(key)?;
    let receipt = state.wallet.add_signer(&who, Address::from(signer))?;
    state.save()?;

    println!("➕ Signer {} added", signer);
    print_receipt(&receipt);
    Ok(())
}

pub fn cmd_remove_signer(state: &mut AppState, key: &str, signer: &str) -> CliResult<()> {
    let who = caller(key)?;
    let receipt = state.wallet.remove_signer(&who, &Address::from(signer))?;
    state.save()?;

    match receipt.removal_refusal() {
        Some((_, reason)) => println!("⚠️  Signer {} not removed: {}", signer, reason),
        None => println!("➖ Signer {} removed", signer),
    }
    print_receipt(&receipt);
    Ok(())
}

pub fn cmd_set_asset(state: &mut AppState, key: &str, asset: &str) -> CliResult<()> {
    let who = caller(key)?;
    let receipt = state.wallet.set_governed_asset(&who, Address::from(asset))?;
    state.save()?;

    println!("🪙 Governed asset is now {}", asset);
    print_receipt(&receipt);
    Ok(())
}

pub fn cmd_set_quorum(state: &mut AppState, key: &str, quorum: u32) -> CliResult<()> {
    let who = caller(key)?;
    let receipt = state.wallet.set_quorum(&who, quorum)?;
    state.save()?;

    println!("🔏 Quorum is now {}", quorum);
    print_receipt(&receipt);
    Ok(())
}

/// Move governed tokens from the key holder into the wallet
pub fn cmd_deposit(state: &mut AppState, key: &str, amount: u128) -> CliResult<()> {
    let who = caller(key)?;
    let wallet = state.wallet.address().clone();
    let asset = state.wallet.governed_asset().clone();
    state
        .wallet
        .host_mut()
        .tokens_mut()
        .transfer(&asset, &who, &wallet, amount)?;
    state.save()?;

    println!("📥 Deposited {} of {} into {}", amount, asset, wallet);
    Ok(())
}

/// Credit native value to an address (defaults to the wallet)
pub fn cmd_faucet(state: &mut AppState, to: Option<&str>, amount: u128) -> CliResult<()> {
    let to = to
        .map(Address::from)
        .unwrap_or_else(|| state.wallet.address().clone());
    state.wallet.host_mut().credit(&to, amount)?;
    state.save()?;

    println!("🚰 Credited {} native to {}", amount, to);
    Ok(())
}

/// Native and governed-asset balances (defaults to the wallet)
pub fn cmd_balance(state: &AppState, address: Option<&str>) -> CliResult<()> {
    let holder = address
        .map(Address::from)
        .unwrap_or_else(|| state.wallet.address().clone());
    let host = state.wallet.host();
    let asset = state.wallet.governed_asset();

    println!("💰 Balance for {}", holder);
    println!("   ├─ Native: {}", host.native_balance(&holder));
    match host.tokens().get(asset) {
        Some(token) => println!(
            "   └─ {}: {}",
            token.symbol(),
            token.balance_of(&holder)
        ),
        None => println!("   └─ {}: unknown token", asset),
    }
    Ok(())
}

/// Wallet summary
pub fn cmd_info(state: &AppState) -> CliResult<()> {
    let wallet = &state.wallet;
    let store = wallet.state().store();
    let stats = wallet.host().stats();

    println!("🏦 Multisig Wallet Info");
    println!("   ├─ Address: {}", wallet.address());
    println!("   ├─ Owner: {}", wallet.owner());
    println!(
        "   ├─ Policy: {}-of-{}",
        wallet.quorum(),
        wallet.state().registry().len()
    );
    println!("   ├─ Governed asset: {}", wallet.governed_asset());
    println!(
        "   ├─ Requests: {} total, {} open",
        store.len(),
        store.open().count()
    );
    println!("   ├─ Events: {}", wallet.history().len());
    println!(
        "   └─ Ledger: {} dispatched, {} failed, {} fees burned",
        stats.dispatched, stats.failed, stats.fees_burned
    );
    Ok(())
}

/// Print the most recent `limit` events
pub fn cmd_events(state: &AppState, limit: usize) -> CliResult<()> {
    let history = state.wallet.history();
    if history.is_empty() {
        println!("📭 No events recorded yet");
        return Ok(());
    }

    let start = history.len().saturating_sub(limit);
    println!("📜 Events ({} of {}):", history.len() - start, history.len());
    for (index, event) in history.iter().enumerate().skip(start) {
        println!("   {:>4} | {}", index, event);
    }
    Ok(())
}

/// Export the snapshot to a file
pub fn cmd_export(state: &AppState, path: &Path) -> CliResult<()> {
    crate::storage::save_to_file(
        &SnapshotRef {
            wallet: state.wallet.state(),
            ledger: state.wallet.host(),
        },
        path,
    )?;
    println!("📦 Wallet exported to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init(dir: &Path, owner: &KeyPair, signers: &[&KeyPair], quorum: u32) {
        let options = InitOptions {
            signers: signers.iter().map(|k| k.address().to_string()).collect(),
            quorum,
            token_name: "PlayCoin".to_string(),
            token_symbol: "PLY".to_string(),
            decimals: 0,
            supply: 1_000_000,
            gas_fee: 0,
            force: false,
        };
        cmd_init(dir, &owner.private_key_hex(), options).unwrap();
    }

    #[test]
    fn test_init_and_reload() {
        let temp_dir = tempfile::tempdir().unwrap();
        let (owner, admin) = (KeyPair::generate(), KeyPair::generate());
        init(temp_dir.path(), &owner, &[&owner, &admin], 2);

        let state = AppState::new(temp_dir.path().to_path_buf()).unwrap();
        assert_eq!(state.wallet.owner(), &owner.address());
        assert_eq!(state.wallet.quorum(), 2);
        assert_eq!(
            state.wallet.get_signers(&admin.address()).unwrap(),
            [owner.address(), admin.address()]
        );
    }

    #[test]
    fn test_missing_wallet_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(AppState::new(temp_dir.path().to_path_buf()).is_err());
    }

    #[test]
    fn test_transfer_flow_survives_restarts() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().to_path_buf();
        let (owner, admin) = (KeyPair::generate(), KeyPair::generate());
        init(&dir, &owner, &[&owner, &admin], 2);

        let mut state = AppState::new(dir.clone()).unwrap();
        cmd_deposit(&mut state, &owner.private_key_hex(), 100).unwrap();
        cmd_propose_transfer(&mut state, &owner.private_key_hex(), "user1", 7, "pay", None)
            .unwrap();

        let mut state = AppState::new(dir.clone()).unwrap();
        cmd_sign(&mut state, &admin.private_key_hex(), 0).unwrap();

        let state = AppState::new(dir).unwrap();
        let request = state.wallet.view_tx(&owner.address(), 0).unwrap();
        assert!(request.executed);
        let coin = state.wallet.governed_asset();
        assert_eq!(state.wallet.host().token_balance(coin, &Address::from("user1")), 7);
        assert_eq!(
            state.wallet.host().token_balance(coin, state.wallet.address()),
            93
        );
    }

    #[test]
    fn test_faucet_overflow_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let owner = KeyPair::generate();
        init(temp_dir.path(), &owner, &[&owner], 1);

        let mut state = AppState::new(temp_dir.path().to_path_buf()).unwrap();
        cmd_faucet(&mut state, None, u128::MAX).unwrap();
        assert!(cmd_faucet(&mut state, None, 1).is_err());

        let state = AppState::new(temp_dir.path().to_path_buf()).unwrap();
        assert_eq!(state.wallet.host().native_balance(state.wallet.address()), u128::MAX);
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let temp_dir = tempfile::tempdir().unwrap();
        let owner = KeyPair::generate();
        init(temp_dir.path(), &owner, &[&owner], 1);
        let address = AppState::new(temp_dir.path().to_path_buf())
            .unwrap()
            .wallet
            .address()
            .clone();

        let other = KeyPair::generate();
        init(temp_dir.path(), &other, &[&other], 1);

        let state = AppState::new(temp_dir.path().to_path_buf()).unwrap();
        assert_eq!(state.wallet.address(), &address);
    }
}
