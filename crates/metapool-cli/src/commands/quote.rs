// crates/metapool-cli/src/commands/quote.rs
//
// `metapool quote --amount <NEAR>`: quote a liquid unstake: fee, expected
// NEAR, and the slippage-adjusted minimum the contract would be asked for.

use clap::Args;

use metapool_core::traits::{AccountBalanceReader, ContractStateReader};
use metapool_economics::fee_curve::format_basis_points;
use metapool_economics::liquid::quote_liquid_unstake;
use metapool_economics::minimum::UnstakeRequest;

use crate::commands::{parse_amount, Context};
use crate::output::{emit, FieldRow};
use crate::snapshot::Snapshot;

/// Liquid unstake quote.
#[derive(Debug, Args)]
pub struct QuoteCmd {
    /// stNEAR amount to sell, e.g. "12.5".
    #[arg(long)]
    pub amount: String,

    /// Slippage tolerance in basis points. Defaults to the configured value.
    #[arg(long)]
    pub slippage: Option<u16>,
}

/// Run the quote command.
///
/// With an account configured the amount is also checked against the minimum
/// unstake policy for that account's stNEAR balance.
pub async fn run(ctx: &Context, cmd: &QuoteCmd) -> Result<(), Box<dyn std::error::Error>> {
    let amount = parse_amount(&cmd.amount)?;
    let with_account = ctx.client.account_id().is_some();
    let snapshot = Snapshot::refresh(&ctx.client, with_account).await?;

    if snapshot.has_account() {
        let request = UnstakeRequest::new(amount)?;
        request.validate(&ctx.config.guard()?, snapshot.account_info().stnear)?;
    }

    let slippage = cmd.slippage.unwrap_or(ctx.config.slippage_basis_points);
    let quote = quote_liquid_unstake(&snapshot.contract_state(), amount, slippage)?;

    let rows = vec![
        FieldRow::new("Amount", quote.amount),
        FieldRow::new("Fee", quote.discount.percent()),
        FieldRow::new("Fee amount", quote.fee),
        FieldRow::new("You receive", quote.expected),
        FieldRow::new(
            &format!("Minimum ({} slippage)", format_basis_points(slippage)),
            quote.min_expected,
        ),
    ];

    emit(ctx.format, &rows, &quote);
    Ok(())
}
