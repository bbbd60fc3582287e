//! Custody CLI - Main entry point

use clap::{Parser, Subcommand};
use custody_core::{Amount, CommitteeKey, InstanceId, Principal, TxId};
use custody_rpc::{commands, AppContext, CustodyConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "custody")]
#[command(about = "Custody - multi-party approval wallets", long_about = None)]
struct Cli {
    /// Data directory path
    #[arg(short, long, default_value = "./data")]
    data: PathBuf,

    /// Optional correlation ID stamped on every record this command writes
    #[arg(long, global = true)]
    correlation_id: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy a wallet for an ordered committee
    Deploy {
        /// Committee member, repeat in order (0x-prefixed, 20 bytes)
        #[arg(long = "owner", required = true)]
        owners: Vec<Principal>,
        /// Approvals needed to execute
        #[arg(long)]
        threshold: usize,
        /// Principal performing the deployment
        #[arg(long)]
        deployer: Principal,
    },

    /// Pay value into a wallet
    Deposit {
        /// Wallet (`instance-N` or `N`)
        instance: InstanceId,
        amount: Amount,
        #[arg(long)]
        from: Principal,
    },

    /// Propose an outbound transfer
    Submit {
        instance: InstanceId,
        /// Destination of the funds
        recipient: Principal,
        amount: Amount,
        /// Calling owner
        #[arg(long)]
        caller: Principal,
        /// Opaque payload, hex encoded
        #[arg(long, default_value = "")]
        payload: String,
    },

    /// Approve a transaction
    Approve {
        instance: InstanceId,
        tx_id: TxId,
        #[arg(long)]
        caller: Principal,
    },

    /// Withdraw an earlier approval
    Revoke {
        instance: InstanceId,
        tx_id: TxId,
        #[arg(long)]
        caller: Principal,
    },

    /// Forward an approved transaction to its recipient
    Execute {
        instance: InstanceId,
        tx_id: TxId,
        #[arg(long)]
        caller: Principal,
    },

    /// Show a wallet and its transactions
    Show { instance: InstanceId },

    /// Find the wallet for a committee key or ordered owner list
    Lookup {
        /// Committee key (64 hex digits)
        #[arg(long, conflicts_with = "owners")]
        key: Option<CommitteeKey>,
        #[arg(long = "owner")]
        owners: Vec<Principal>,
    },

    /// List wallets a principal is an owner of
    Instances { principal: Principal },

    /// Number of deployed wallets
    Count,

    /// Print the journal, optionally for one wallet
    Replay {
        #[arg(long)]
        instance: Option<InstanceId>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = CustodyConfig::load(&cli.data)?;

    // RUST_LOG wins over the configured filter
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_filter)?,
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Create application context
    let mut ctx = AppContext::new(&cli.data, config)?;
    let correlation_id = cli
        .correlation_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    match cli.command {
        Commands::Deploy {
            owners,
            threshold,
            deployer,
        } => {
            commands::deploy(&mut ctx, owners, threshold, deployer, &correlation_id)?;
        }

        Commands::Deposit {
            instance,
            amount,
            from,
        } => {
            commands::deposit(&mut ctx, instance, from, amount, &correlation_id)?;
        }

        Commands::Submit {
            instance,
            recipient,
            amount,
            caller,
            payload,
        } => {
            let payload = hex::decode(payload.strip_prefix("0x").unwrap_or(&payload))?;
            commands::submit(
                &mut ctx,
                instance,
                caller,
                recipient,
                amount,
                payload,
                &correlation_id,
            )?;
        }

        Commands::Approve {
            instance,
            tx_id,
            caller,
        } => {
            commands::approve(&mut ctx, instance, tx_id, caller, &correlation_id)?;
        }

        Commands::Revoke {
            instance,
            tx_id,
            caller,
        } => {
            commands::revoke(&mut ctx, instance, tx_id, caller, &correlation_id)?;
        }

        Commands::Execute {
            instance,
            tx_id,
            caller,
        } => {
            commands::execute(&mut ctx, instance, tx_id, caller, &correlation_id)?;
        }

        Commands::Show { instance } => {
            commands::show(&ctx, instance)?;
        }

        Commands::Lookup { key, owners } => {
            commands::lookup(&ctx, key, &owners)?;
        }

        Commands::Instances { principal } => {
            commands::instances(&ctx, principal)?;
        }

        Commands::Count => {
            commands::count(&ctx)?;
        }

        Commands::Replay { instance } => {
            commands::replay(&ctx, instance).await?;
        }
    }

    Ok(())
}
