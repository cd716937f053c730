// crates/metapool-cli/src/commands/delayed.rs
//
// `metapool delayed --amount <NEAR>`: plan a delayed unstake and estimate
// when the funds become withdrawable. Nothing is submitted.

use chrono::Utc;
use clap::Args;

use metapool_core::error::MetaPoolError;
use metapool_core::traits::AccountBalanceReader;
use metapool_epoch::DelayedUnstakePlan;

use crate::commands::{parse_amount, Context};
use crate::output::{emit, FieldRow};
use crate::snapshot::Snapshot;

const NO_REWARDS_NOTE: &str = "You will not receive rewards during that period.";
const UNKNOWN_WAIT_NOTE: &str = "Funds will be available after the unstaking period. \
                                 You will not receive rewards during that period.";

/// Delayed unstake plan.
#[derive(Debug, Args)]
pub struct DelayedCmd {
    /// stNEAR amount to unstake, e.g. "12.5".
    #[arg(long)]
    pub amount: String,
}

/// Run the delayed command.
pub async fn run(ctx: &Context, cmd: &DelayedCmd) -> Result<(), Box<dyn std::error::Error>> {
    let amount = parse_amount(&cmd.amount)?;
    let snapshot = Snapshot::refresh(&ctx.client, true).await?;
    let account = snapshot.account_info();

    let plan = match ctx.planner()?.plan(Utc::now(), amount, &account).await {
        Ok(plan) => plan,
        Err(e @ (MetaPoolError::DelayQueryFailed(_) | MetaPoolError::EpochFetchFailed { .. })) => {
            tracing::warn!("Wait estimate unavailable: {}", e);
            let rows = vec![
                FieldRow::new("Amount", amount),
                FieldRow::new("Note", UNKNOWN_WAIT_NOTE),
            ];
            emit(
                ctx.format,
                &rows,
                &serde_json::json!({ "status": "unknown_wait", "amount": amount }),
            );
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let rows = match &plan {
        DelayedUnstakePlan::WithdrawFirst { unstaked } => vec![
            FieldRow::new("Withdrawable", *unstaked),
            FieldRow::new(
                "Note",
                "Withdraw your previously unstaked NEAR before starting a new delayed unstake.",
            ),
        ],
        DelayedUnstakePlan::Ready {
            amount,
            wait_epochs,
            estimate,
        } => vec![
            FieldRow::new("Amount", *amount),
            FieldRow::new("Wait epochs", wait_epochs),
            FieldRow::new(
                "Note",
                format!(
                    "Funds will be available in approximately {} hours. {}",
                    estimate.hours, NO_REWARDS_NOTE
                ),
            ),
        ],
    };

    emit(ctx.format, &rows, &plan);
    Ok(())
}
