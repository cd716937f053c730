// crates/metapool-cli/src/commands/limits.rs
//
// `metapool limits [--amount <NEAR>]`: minimums for staking, liquidity and
// unstaking, and the "stake max" amount for the configured wallet. With
// `--amount`, each operation's check is run against it.

use clap::Args;
use serde::Serialize;

use metapool_core::amount::Yocto;
use metapool_core::traits::{AccountBalanceReader, ContractStateReader};
use metapool_economics::deposit::{
    check_add_liquidity, check_min_deposit, check_remove_liquidity, max_stakeable,
    min_add_liquidity,
};

use crate::commands::{parse_amount, Context};
use crate::output::{emit, FieldRow};
use crate::snapshot::Snapshot;

/// Operation minimums.
#[derive(Debug, Args)]
pub struct LimitsCmd {
    /// Amount to check against each minimum.
    #[arg(long)]
    pub amount: Option<String>,
}

#[derive(Debug, Serialize)]
struct Limits {
    min_deposit: Yocto,
    min_add_liquidity: Yocto,
    min_unstake: Yocto,
    max_stakeable: Option<Yocto>,
    checks: Vec<Check>,
}

#[derive(Debug, Serialize)]
struct Check {
    operation: &'static str,
    ok: bool,
    message: Option<String>,
}

impl Check {
    fn from_result<E: std::fmt::Display>(operation: &'static str, result: Result<(), E>) -> Self {
        Self {
            operation,
            ok: result.is_ok(),
            message: result.err().map(|e| e.to_string()),
        }
    }
}

/// Run the limits command.
pub async fn run(ctx: &Context, cmd: &LimitsCmd) -> Result<(), Box<dyn std::error::Error>> {
    let with_account = ctx.client.account_id().is_some();
    let snapshot = Snapshot::refresh(&ctx.client, with_account).await?;
    let state = snapshot.contract_state();
    let guard = ctx.config.guard()?;

    let max = if with_account {
        Some(max_stakeable(ctx.client.wallet_balance().await?))
    } else {
        None
    };

    let mut checks = Vec::new();
    if let Some(input) = &cmd.amount {
        let amount = parse_amount(input)?;
        let balance = snapshot.account_info().stnear;
        checks.push(Check::from_result("stake", check_min_deposit(amount, &state)));
        checks.push(Check::from_result("add liquidity", check_add_liquidity(amount, &state)));
        checks.push(Check::from_result("remove liquidity", check_remove_liquidity(amount)));
        if snapshot.has_account() {
            checks.push(Check::from_result("unstake", guard.check(amount, balance)));
        }
    }

    let limits = Limits {
        min_deposit: state.min_deposit_amount,
        min_add_liquidity: min_add_liquidity(&state),
        min_unstake: guard.min_unstake(),
        max_stakeable: max,
        checks,
    };

    let mut rows = vec![
        FieldRow::new("Min stake", limits.min_deposit),
        FieldRow::new("Min add liquidity", limits.min_add_liquidity),
        FieldRow::new("Min unstake", limits.min_unstake),
    ];
    if let Some(max) = limits.max_stakeable {
        rows.push(FieldRow::new("Stake max", max));
    }
    for check in &limits.checks {
        let value = match &check.message {
            None => "ok".to_string(),
            Some(msg) => msg.clone(),
        };
        rows.push(FieldRow::new(check.operation, value));
    }

    emit(ctx.format, &rows, &limits);
    Ok(())
}
