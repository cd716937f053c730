// crates/metapool-cli/src/commands/mod.rs
//
// Command module declarations and the shared per-invocation context.

pub mod account;
pub mod delayed;
pub mod discount;
pub mod epoch;
pub mod limits;
pub mod quote;
pub mod status;

use std::sync::Arc;

use metapool_core::amount::Yocto;
use metapool_core::error::MetaPoolError;
use metapool_epoch::{DelayedUnstakePlanner, EpochClock};

use crate::config::CliConfig;
use crate::near_rpc::NearRpcClient;
use crate::output::OutputFormat;

/// Everything a command needs: resolved config, the RPC client, the epoch
/// clock, and the output format.
pub struct Context {
    pub config: CliConfig,
    pub client: Arc<NearRpcClient>,
    pub clock: Arc<EpochClock>,
    pub format: OutputFormat,
}

impl Context {
    pub fn new(config: CliConfig, client: NearRpcClient, format: OutputFormat) -> Self {
        let client = Arc::new(client);
        let clock = Arc::new(EpochClock::new(client.clone()));
        Self {
            config,
            client,
            clock,
            format,
        }
    }

    pub fn planner(&self) -> Result<DelayedUnstakePlanner, MetaPoolError> {
        Ok(DelayedUnstakePlanner::new(self.clock.clone(), self.client.clone())
            .with_guard(self.config.guard()?)
            .with_estimator(self.config.estimator()))
    }
}

/// Parse a user-supplied NEAR amount.
pub fn parse_amount(input: &str) -> Result<Yocto, MetaPoolError> {
    Yocto::parse_near(input)
}
