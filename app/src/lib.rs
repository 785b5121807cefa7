//! dex-router command line application library

pub mod commands;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use auto_router::AutoRouter;
use clap::{Parser, Subcommand};
use ledger_client::{InMemoryLedger, LedgerSnapshot};
use router_core::{Address, RouterConfig};

use commands::SwapArgs;

/// Quote multi-hop swaps and build their transactions from a ledger snapshot
#[derive(Debug, Parser)]
#[command(name = "dex-router", version, about)]
pub struct Cli {
    /// Router configuration (JSON); defaults apply when omitted
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Ledger snapshot with pools, token metadata and USD prices (JSON)
    #[arg(long, global = true, default_value = "snapshot.json")]
    pub snapshot: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve the best route and print the quote
    Quote(SwapArgs),

    /// Resolve the best route and print the transactions executing it
    Transactions {
        /// Address signing the transactions
        #[arg(long)]
        sender: Address,

        #[command(flatten)]
        swap: SwapArgs,
    },
}

/// Install the tracing subscriber. Logs go to stderr so stdout stays JSON.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,auto_router=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<RouterConfig> {
    match path {
        Some(path) => RouterConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(RouterConfig::default()),
    }
}

/// Run the application
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_ref())?;
    let snapshot = LedgerSnapshot::load(&cli.snapshot)
        .with_context(|| format!("loading snapshot from {}", cli.snapshot.display()))?;

    tracing::info!(
        network = %config.network,
        pools = snapshot.pools.len(),
        "Starting dex-router"
    );

    let ledger = Arc::new(InMemoryLedger::new(snapshot));
    let router = AutoRouter::from_ledger(config, ledger);

    let output = match &cli.command {
        Command::Quote(swap) => serde_json::to_string_pretty(&commands::quote(&router, swap).await?)?,
        Command::Transactions { sender, swap } => serde_json::to_string_pretty(
            &commands::transactions(&router, sender, swap).await?,
        )?,
    };
    println!("{}", output);
    Ok(())
}
