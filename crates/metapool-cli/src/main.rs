// crates/metapool-cli/src/main.rs
//
// CLI entrypoint for the Meta Pool staking tools.
//
// Loads configuration, initializes tracing, connects to a NEAR RPC endpoint
// and runs one read-only subcommand: pool status, account balances, fee
// previews and quotes, delayed unstake planning, epoch timing, and limits.

mod commands;
mod config;
mod near_rpc;
mod output;
mod snapshot;

use std::time::Duration;

use clap::{Parser, Subcommand};
use commands::delayed::DelayedCmd;
use commands::discount::DiscountCmd;
use commands::limits::LimitsCmd;
use commands::quote::QuoteCmd;
use commands::Context;
use config::CliConfig;
use near_rpc::NearRpcClient;
use output::OutputFormat;

/// Meta Pool CLI: liquid staking fees and unstake timing on NEAR.
#[derive(Parser, Debug)]
#[command(
    name = "metapool",
    version = "0.1.0",
    about = "Meta Pool CLI: liquid unstake fees and delayed unstake timing on NEAR"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "~/.metapool/config.toml")]
    config: String,

    /// Network preset: mainnet or testnet.
    #[arg(long, global = true)]
    network: Option<String>,

    /// JSON-RPC endpoint, overriding the network preset.
    #[arg(long, global = true)]
    rpc: Option<String>,

    /// Meta Pool contract account, overriding the network preset.
    #[arg(long, global = true)]
    contract: Option<String>,

    /// Account to inspect.
    #[arg(long, global = true)]
    account: Option<String>,

    /// Print JSON instead of a table.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Display pool-wide contract state.
    Status,

    /// Display account balances and delayed unstake status.
    Account,

    /// Preview the liquid unstake fee for an amount.
    Discount(DiscountCmd),

    /// Quote a liquid unstake.
    Quote(QuoteCmd),

    /// Plan a delayed unstake and estimate the wait.
    Delayed(DelayedCmd),

    /// Display the current epoch boundary.
    Epoch,

    /// Display operation minimums and check an amount against them.
    Limits(LimitsCmd),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = expand_tilde(&cli.config);
    let loaded = CliConfig::load(&config_path);
    let mut config = match &loaded {
        Ok(cfg) => cfg.clone(),
        Err(_) => CliConfig::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match loaded {
        Ok(_) => tracing::debug!("Loaded configuration from {}", config_path),
        Err(e) => tracing::debug!(
            "Could not load config from {}: {}. Using defaults.",
            config_path,
            e
        ),
    }

    // Command-line flags override the config file.
    if let Some(network) = cli.network {
        config.network = network;
    }
    if cli.rpc.is_some() {
        config.rpc_url = cli.rpc;
    }
    if cli.contract.is_some() {
        config.contract_id = cli.contract;
    }
    if cli.account.is_some() {
        config.account_id = cli.account;
    }

    let client = NearRpcClient::new(
        config.rpc_url()?,
        config.contract_id()?,
        config.account_id.clone(),
        Duration::from_secs(config.request_timeout_secs),
    );
    tracing::debug!(
        "Using contract {} via {}",
        client.contract_id(),
        client.endpoint()
    );

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Table
    };
    let ctx = Context::new(config, client, format);

    match &cli.command {
        Commands::Status => commands::status::run(&ctx).await?,
        Commands::Account => commands::account::run(&ctx).await?,
        Commands::Discount(cmd) => commands::discount::run(&ctx, cmd).await?,
        Commands::Quote(cmd) => commands::quote::run(&ctx, cmd).await?,
        Commands::Delayed(cmd) => commands::delayed::run(&ctx, cmd).await?,
        Commands::Epoch => commands::epoch::run(&ctx).await?,
        Commands::Limits(cmd) => commands::limits::run(&ctx, cmd).await?,
    }

    Ok(())
}

/// Expand `~` at the start of a path to the user's home directory.
fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return format!("{}/{}", home.display(), rest);
        }
    }
    path.to_string()
}
