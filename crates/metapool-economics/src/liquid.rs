// crates/metapool-economics/src/liquid.rs
//
// Liquid unstake quotes and the live discount preview shown while the user
// types an amount.

use serde::Serialize;

use metapool_core::amount::{Yocto, BASIS_POINTS_DENOMINATOR};
use metapool_core::error::MetaPoolError;
use metapool_core::state::ContractState;

use crate::fee_curve::{format_basis_points, DiscountCurve, DiscountResult};

/// Auto-slippage tolerance applied to the expected amount: 1%.
pub const DEFAULT_SLIPPAGE_BASIS_POINTS: u16 = 100;

/// What a liquid unstake of `amount` stNEAR is expected to pay out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LiquidUnstakeQuote {
    pub amount: Yocto,
    pub discount: DiscountResult,
    /// `amount - expected`.
    pub fee: Yocto,
    /// `amount * (10000 - bp) / 10000`.
    pub expected: Yocto,
    /// `expected` less the slippage tolerance; passed to the contract as the
    /// minimum acceptable payout.
    pub min_expected: Yocto,
}

/// Quote a liquid unstake against the given snapshot.
///
/// # Errors
/// - `MetaPoolError::InvalidAmount` for a zero amount.
/// - `MetaPoolError::InsufficientLiquidity` if the pool cannot fund `amount`.
/// - `MetaPoolError::InvalidCurveParameters` for a malformed curve.
pub fn quote_liquid_unstake(
    state: &ContractState,
    amount: Yocto,
    slippage_bp: u16,
) -> Result<LiquidUnstakeQuote, MetaPoolError> {
    if amount.is_zero() {
        return Err(MetaPoolError::InvalidAmount(
            "amount should be greater than zero".to_string(),
        ));
    }
    if amount > state.nslp_liquidity {
        return Err(MetaPoolError::InsufficientLiquidity {
            available: state.nslp_liquidity,
        });
    }

    let discount = DiscountCurve::from_state(state)?.discount(state.nslp_liquidity, amount)?;
    let keep_bp = complement(discount.basis_points);
    let expected = amount.apply_basis_points(keep_bp);
    let min_expected = expected.apply_basis_points(complement(slippage_bp));

    Ok(LiquidUnstakeQuote {
        amount,
        discount,
        fee: amount - expected,
        expected,
        min_expected,
    })
}

fn complement(basis_points: u16) -> u16 {
    // BASIS_POINTS_DENOMINATOR fits u16
    (BASIS_POINTS_DENOMINATOR as u16).saturating_sub(basis_points)
}

/// Fee shown next to the unstake input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscountPreview {
    pub basis_points: u16,
    pub insufficient_liquidity: bool,
}

impl DiscountPreview {
    /// `"0.25%"`, or `"1.8% - Not enough liquidity"`.
    pub fn label(&self) -> String {
        let pct = format_basis_points(self.basis_points);
        if self.insufficient_liquidity {
            format!("{} - Not enough liquidity", pct)
        } else {
            pct
        }
    }
}

/// Preview the discount for raw user input.
///
/// Empty, unparseable, or zero input shows the pool's current discount.
pub fn preview_discount(
    state: &ContractState,
    input: &str,
) -> Result<DiscountPreview, MetaPoolError> {
    let sell = match Yocto::parse_near(input) {
        Ok(amount) if !amount.is_zero() => amount,
        _ => {
            return Ok(DiscountPreview {
                basis_points: state.nslp_current_discount_basis_points,
                insufficient_liquidity: false,
            })
        }
    };

    let result = DiscountCurve::from_state(state)?.discount(state.nslp_liquidity, sell)?;
    Ok(DiscountPreview {
        basis_points: result.basis_points,
        insufficient_liquidity: result.insufficient_liquidity,
    })
}
