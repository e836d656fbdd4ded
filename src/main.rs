//! PlayCoin Multisig CLI Application
//!
//! A command-line interface for operating a quorum-gated multisig wallet.

use clap::{Parser, Subcommand};
use playcoin_multisig::cli::{self, AppState, InitOptions};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "multisig")]
#[command(author = "Darshan")]
#[command(version = "0.1.0")]
#[command(about = "A quorum-gated multi-signature wallet for token contracts", long_about = None)]
struct Cli {
    /// Data directory for wallet storage
    #[arg(short, long, default_value = ".multisig_data", global = true)]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a signer key pair
    Keygen,

    /// Deploy the governed token and a new wallet
    Init {
        /// Owner's private key (hex)
        #[arg(short, long)]
        key: String,

        /// Signer address (repeat for each signer)
        #[arg(short, long = "signer", required = true)]
        signers: Vec<String>,

        /// Confirmations required to execute
        #[arg(short, long, default_value = "2")]
        quorum: u32,

        /// Governed token name
        #[arg(long, default_value = "PlayCoin")]
        token_name: String,

        /// Governed token symbol
        #[arg(long, default_value = "PLY")]
        token_symbol: String,

        #[arg(long, default_value = "18")]
        decimals: u8,

        /// Total supply in base units, credited to the owner
        #[arg(long, default_value = "1000000000000000000000000")]
        supply: u128,

        /// Native units charged per dispatched call
        #[arg(long, default_value = "0")]
        gas_fee: u128,

        /// Replace an existing wallet
        #[arg(long)]
        force: bool,
    },

    /// Open a transaction request
    Propose {
        #[command(subcommand)]
        action: ProposeCommands,
    },

    /// Confirm a request
    Sign {
        #[arg(short, long)]
        key: String,
        /// Request id
        id: u64,
    },

    /// Reject a request
    Reject {
        #[arg(short, long)]
        key: String,
        id: u64,
    },

    /// Retry dispatch of a confirmed request
    Run {
        #[arg(short, long)]
        key: String,
        id: u64,
    },

    /// Withdraw a pending request (proposer or owner)
    Cancel {
        #[arg(short, long)]
        key: String,
        id: u64,
    },

    /// Show a request and its votes
    Show {
        #[arg(short, long)]
        key: String,
        id: u64,
    },

    /// List all requests
    List {
        #[arg(short, long)]
        key: String,
    },

    /// List current signers
    Signers {
        #[arg(short, long)]
        key: String,
    },

    /// Add a signer (owner only)
    AddSigner {
        #[arg(short, long)]
        key: String,
        signer: String,
    },

    /// Remove a signer (owner only)
    RemoveSigner {
        #[arg(short, long)]
        key: String,
        signer: String,
    },

    /// Change the governed token (owner only)
    SetAsset {
        #[arg(short, long)]
        key: String,
        asset: String,
    },

    /// Change the quorum threshold (owner only)
    SetQuorum {
        #[arg(short, long)]
        key: String,
        quorum: u32,
    },

    /// Move governed tokens from the key holder into the wallet
    Deposit {
        #[arg(short, long)]
        key: String,
        amount: u128,
    },

    /// Credit native value (defaults to the wallet)
    Faucet {
        #[arg(short, long)]
        to: Option<String>,
        amount: u128,
    },

    /// Show balances (defaults to the wallet)
    Balance {
        #[arg(short, long)]
        address: Option<String>,
    },

    /// Display wallet information
    Info,

    /// Show recent wallet events
    Events {
        /// Number of events to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Export the wallet snapshot to a file
    Export {
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Subcommand)]
enum ProposeCommands {
    /// Transfer governed tokens out of the wallet
    Transfer {
        #[arg(short, long)]
        key: String,
        #[arg(long)]
        to: String,
        #[arg(short, long)]
        amount: u128,
        #[arg(long, default_value = "")]
        description: String,
        /// Unix time after which the request no longer accepts votes
        #[arg(long)]
        expiry: Option<u64>,
    },

    /// Send native value held by the wallet
    Refund {
        #[arg(short, long)]
        key: String,
        #[arg(long)]
        to: String,
        #[arg(short, long)]
        amount: u128,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        expiry: Option<u64>,
    },

    /// Arbitrary hex call data
    Raw {
        #[arg(short, long)]
        key: String,
        /// Call target (defaults to the governed asset)
        #[arg(short, long)]
        target: Option<String>,
        /// Hex-encoded call data
        #[arg(long)]
        data: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        expiry: Option<u64>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Commands that don't need a persisted wallet
    match cli.command {
        Commands::Keygen => return cli::cmd_keygen(),
        Commands::Init {
            key,
            signers,
            quorum,
            token_name,
            token_symbol,
            decimals,
            supply,
            gas_fee,
            force,
        } => {
            let options = InitOptions {
                signers,
                quorum,
                token_name,
                token_symbol,
                decimals,
                supply,
                gas_fee,
                force,
            };
            return cli::cmd_init(&cli.data_dir, &key, options);
        }
        command => run(command, cli.data_dir),
    }
}

fn run(command: Commands, data_dir: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let mut state = AppState::new(data_dir)?;

    match command {
        Commands::Keygen | Commands::Init { .. } => unreachable!(),

        Commands::Propose { action } => match action {
            ProposeCommands::Transfer {
                key,
                to,
                amount,
                description,
                expiry,
            } => cli::cmd_propose_transfer(&mut state, &key, &to, amount, &description, expiry)?,
            ProposeCommands::Refund {
                key,
                to,
                amount,
                description,
                expiry,
            } => cli::cmd_propose_refund(&mut state, &key, &to, amount, &description, expiry)?,
            ProposeCommands::Raw {
                key,
                target,
                data,
                description,
                expiry,
            } => cli::cmd_propose_raw(
                &mut state,
                &key,
                target.as_deref(),
                &data,
                &description,
                expiry,
            )?,
        },

        Commands::Sign { key, id } => cli::cmd_sign(&mut state, &key, id)?,
        Commands::Reject { key, id } => cli::cmd_reject(&mut state, &key, id)?,
        Commands::Run { key, id } => cli::cmd_run(&mut state, &key, id)?,
        Commands::Cancel { key, id } => cli::cmd_cancel(&mut state, &key, id)?,
        Commands::Show { key, id } => cli::cmd_show(&state, &key, id)?,
        Commands::List { key } => cli::cmd_list(&state, &key)?,
        Commands::Signers { key } => cli::cmd_signers(&state, &key)?,

        Commands::AddSigner { key, signer } => cli::cmd_add_signer(&mut state, &key, &signer)?,
        Commands::RemoveSigner { key, signer } => {
            cli::cmd_remove_signer(&mut state, &key, &signer)?
        }
        Commands::SetAsset { key, asset } => cli::cmd_set_asset(&mut state, &key, &asset)?,
        Commands::SetQuorum { key, quorum } => cli::cmd_set_quorum(&mut state, &key, quorum)?,

        Commands::Deposit { key, amount } => cli::cmd_deposit(&mut state, &key, amount)?,
        Commands::Faucet { to, amount } => cli::cmd_faucet(&mut state, to.as_deref(), amount)?,
        Commands::Balance { address } => cli::cmd_balance(&state, address.as_deref())?,
        Commands::Info => cli::cmd_info(&state)?,
        Commands::Events { limit } => cli::cmd_events(&state, limit)?,
        Commands::Export { output } => cli::cmd_export(&state, &output)?,
    }

    Ok(())
}
