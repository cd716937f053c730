// crates/metapool-cli/src/commands/account.rs
//
// `metapool account`: balances of the configured account and the status of
// its delayed unstake, if one is in progress.

use chrono::Utc;
use serde::Serialize;

use metapool_core::epoch::{EpochInfo, DEFAULT_EPOCH_DURATION_MS};
use metapool_core::error::MetaPoolError;
use metapool_core::state::AccountInfo;
use metapool_core::traits::AccountBalanceReader;
use metapool_epoch::PendingWithdrawal;

use crate::commands::Context;
use crate::output::{emit, FieldRow};
use crate::snapshot::Snapshot;

#[derive(Debug, Serialize)]
struct AccountReport {
    account: AccountInfo,
    pending_withdrawal: Option<PendingWithdrawal>,
}

/// Run the account command.
pub async fn run(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = Snapshot::refresh(&ctx.client, true).await?;
    let account = snapshot.account_info();
    let pending = pending_withdrawal(ctx, &account).await?;

    let mut rows = vec![
        FieldRow::new("Account", &account.account_id),
        FieldRow::new("stNEAR", account.stnear),
        FieldRow::new("META", account.meta),
        FieldRow::new("Liquidity share", account.nslp_share_value),
        FieldRow::new("Trip rewards", account.trip_rewards),
    ];

    match &pending {
        None => rows.push(FieldRow::new("Delayed unstake", "none")),
        Some(p) if p.can_withdraw => {
            rows.push(FieldRow::new("Delayed unstake", p.amount));
            rows.push(FieldRow::new("Status", "ready to withdraw"));
        }
        Some(p) => {
            rows.push(FieldRow::new("Delayed unstake", p.amount));
            rows.push(FieldRow::new("Available in", format!("~{} hours", p.hours)));
            if let Some(at) = p.withdrawable_at {
                rows.push(FieldRow::new("Withdrawable at", at.format("%Y-%m-%d %H:%M UTC")));
            }
        }
    }

    let report = AccountReport {
        account,
        pending_withdrawal: pending,
    };
    emit(ctx.format, &rows, &report);
    Ok(())
}

/// Pending withdrawal status. When the epoch cannot be fetched the estimate
/// falls back to a nominal epoch ending at the error's fallback boundary.
async fn pending_withdrawal(
    ctx: &Context,
    account: &AccountInfo,
) -> Result<Option<PendingWithdrawal>, MetaPoolError> {
    let now = Utc::now();
    match ctx.planner()?.pending_withdrawal(now, account).await {
        Err(MetaPoolError::EpochFetchFailed {
            reason,
            fallback_ends_at,
        }) => {
            tracing::warn!("Using nominal epoch length, epoch lookup failed: {}", reason);
            let epoch = EpochInfo::new(fallback_ends_at, DEFAULT_EPOCH_DURATION_MS)?;
            Ok(ctx.config.estimator().pending_withdrawal(now, account, &epoch))
        }
        other => other,
    }
}
