// crates/metapool-cli/src/commands/status.rs
//
// `metapool status`: display the pool-wide contract state.

use metapool_core::traits::ContractStateReader;
use metapool_economics::fee_curve::format_basis_points;

use crate::commands::Context;
use crate::output::{emit, FieldRow};
use crate::snapshot::Snapshot;

/// Run the status command.
pub async fn run(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = Snapshot::refresh(&ctx.client, false).await?;
    let state = snapshot.contract_state();

    let rows = vec![
        FieldRow::new("Contract", ctx.client.contract_id()),
        FieldRow::new("Total staked", state.total_for_staking),
        FieldRow::new("Historic rewards", state.accumulated_staked_rewards),
        FieldRow::new("Staking pools", state.staking_pools_count),
        FieldRow::new("Liquidity", state.nslp_liquidity),
        FieldRow::new("Pool stNEAR", state.nslp_stnear_balance),
        FieldRow::new("Target liquidity", state.nslp_target),
        FieldRow::new(
            "Liquid unstake fee",
            format_basis_points(state.nslp_current_discount_basis_points),
        ),
        FieldRow::new(
            "Fee range",
            format!(
                "{} - {}",
                format_basis_points(state.nslp_min_discount_basis_points),
                format_basis_points(state.nslp_max_discount_basis_points)
            ),
        ),
        FieldRow::new("Min deposit", state.min_deposit_amount),
    ];

    emit(ctx.format, &rows, &state);
    Ok(())
}
