use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use suiswap::app::{self, AppCfg, AppCommand};
use suiswap::config::Config;

#[derive(Parser, Debug)]
#[command(version, about = "Sui token swap form over the Aftermath router")]
struct Args {
    /// Path to config file (optional)
    #[arg(long)]
    config: Option<String>,

    /// Sui fullnode JSON-RPC URL (overrides config)
    #[arg(long)]
    rpc_url: Option<String>,

    /// Aftermath API base URL (overrides config)
    #[arg(long)]
    aggregator_url: Option<String>,

    /// Wallet address to connect (overrides config)
    #[arg(long)]
    address: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print USD prices of both tokens
    Prices,

    /// Print wallet balances of both tokens
    Balances,

    /// Quote one amount and print the form
    Quote {
        /// Amount of the pay token
        #[arg(short, long)]
        amount: String,

        /// Pay with the receive token instead
        #[arg(short, long)]
        reverse: bool,
    },

    /// Interactive swap form
    Repl,
}

impl From<Command> for AppCommand {
    fn from(command: Command) -> Self {
        match command {
            Command::Prices => AppCommand::Prices,
            Command::Balances => AppCommand::Balances,
            Command::Quote { amount, reverse } => AppCommand::Quote { amount, reverse },
            Command::Repl => AppCommand::Repl,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    // Load base configuration from file if provided
    let base_config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => Config::default(),
    };

    let app_cfg = AppCfg::from_config(base_config).with_overrides(
        args.rpc_url,
        args.aggregator_url,
        args.address,
    );

    app::run(app_cfg, args.command.into()).await
}
