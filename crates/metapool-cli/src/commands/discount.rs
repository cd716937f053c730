// crates/metapool-cli/src/commands/discount.rs
//
// `metapool discount --amount <NEAR>`: preview the liquid unstake fee for an
// amount, as the fee label next to the unstake input does.

use clap::Args;

use metapool_core::traits::ContractStateReader;
use metapool_economics::liquid::preview_discount;

use crate::commands::Context;
use crate::output::{emit, FieldRow};
use crate::snapshot::Snapshot;

/// Liquid unstake fee preview.
#[derive(Debug, Args)]
pub struct DiscountCmd {
    /// stNEAR amount to sell, e.g. "12.5". Empty or unparseable input shows
    /// the current fee.
    #[arg(long, default_value = "")]
    pub amount: String,
}

/// Run the discount command.
pub async fn run(ctx: &Context, cmd: &DiscountCmd) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = Snapshot::refresh(&ctx.client, false).await?;
    let state = snapshot.contract_state();
    let preview = preview_discount(&state, &cmd.amount)?;

    let rows = vec![
        FieldRow::new("Amount", &cmd.amount),
        FieldRow::new("Liquidity", state.nslp_liquidity),
        FieldRow::new("Liquid unstake fee", preview.label()),
    ];

    emit(ctx.format, &rows, &preview);
    Ok(())
}
