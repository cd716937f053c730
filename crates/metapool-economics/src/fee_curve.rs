// crates/metapool-economics/src/fee_curve.rs
//
// Liquidity-pool swap discount for liquid (instant) unstakes.
//
// The discount follows a piecewise-linear curve over the liquidity left in
// the pool after the swap:
//   - liquidity_after >= target: min discount
//   - 0 <= liquidity_after < target: linear from max (empty pool) to min (target)
//   - sell > liquidity: max discount, the pool cannot fund the swap
//
// Integer arithmetic throughout; results match the contract's own fee.

use serde::Serialize;

use metapool_core::amount::{mul_div_floor, Yocto, BASIS_POINTS_DENOMINATOR};
use metapool_core::error::MetaPoolError;
use metapool_core::state::ContractState;

/// Discount in basis points for selling `sell_amount` into a pool holding
/// `liquidity`.
///
/// # Errors
/// Returns `MetaPoolError::InvalidCurveParameters` if `target` is zero,
/// `min_bp > max_bp`, or `max_bp > 10000`. Never fails otherwise, including
/// for zero amounts.
pub fn compute_discount(
    liquidity: Yocto,
    sell_amount: Yocto,
    target: Yocto,
    min_bp: u16,
    max_bp: u16,
) -> Result<u16, MetaPoolError> {
    validate_curve(target, min_bp, max_bp)?;

    if sell_amount > liquidity {
        return Ok(max_bp);
    }

    let liquidity_after = liquidity - sell_amount;
    if liquidity_after >= target {
        return Ok(min_bp);
    }

    // 0 <= liquidity_after < target, so 0 <= proportion < range
    let range = u32::from(max_bp - min_bp);
    let proportion = mul_div_floor(liquidity_after.as_yocto(), range, target.as_yocto())
        .and_then(|p| u16::try_from(p).ok())
        .ok_or_else(|| {
            MetaPoolError::InvalidCurveParameters(format!(
                "discount proportion out of range for target {}",
                target
            ))
        })?;

    Ok(max_bp - proportion)
}

fn validate_curve(target: Yocto, min_bp: u16, max_bp: u16) -> Result<(), MetaPoolError> {
    if target.is_zero() {
        return Err(MetaPoolError::InvalidCurveParameters(
            "liquidity target must be positive".to_string(),
        ));
    }
    if min_bp > max_bp {
        return Err(MetaPoolError::InvalidCurveParameters(format!(
            "min discount {} bp exceeds max discount {} bp",
            min_bp, max_bp
        )));
    }
    if u32::from(max_bp) > BASIS_POINTS_DENOMINATOR {
        return Err(MetaPoolError::InvalidCurveParameters(format!(
            "max discount {} bp exceeds {} bp",
            max_bp, BASIS_POINTS_DENOMINATOR
        )));
    }
    Ok(())
}

/// A validated discount curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiscountCurve {
    target: Yocto,
    min_bp: u16,
    max_bp: u16,
}

impl DiscountCurve {
    /// Create a curve, validating its parameters.
    pub fn new(target: Yocto, min_bp: u16, max_bp: u16) -> Result<Self, MetaPoolError> {
        validate_curve(target, min_bp, max_bp)?;
        Ok(Self {
            target,
            min_bp,
            max_bp,
        })
    }

    /// Extract the curve configured in a contract state snapshot.
    pub fn from_state(state: &ContractState) -> Result<Self, MetaPoolError> {
        Self::new(
            state.nslp_target,
            state.nslp_min_discount_basis_points,
            state.nslp_max_discount_basis_points,
        )
    }

    pub fn target(&self) -> Yocto {
        self.target
    }

    pub fn min_bp(&self) -> u16 {
        self.min_bp
    }

    pub fn max_bp(&self) -> u16 {
        self.max_bp
    }

    /// Discount for selling `sell_amount` against the given liquidity reading.
    pub fn discount(
        &self,
        liquidity: Yocto,
        sell_amount: Yocto,
    ) -> Result<DiscountResult, MetaPoolError> {
        let basis_points =
            compute_discount(liquidity, sell_amount, self.target, self.min_bp, self.max_bp)?;
        Ok(DiscountResult {
            basis_points,
            liquidity,
            insufficient_liquidity: sell_amount > liquidity,
        })
    }
}

/// A discount together with the liquidity reading it was computed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiscountResult {
    pub basis_points: u16,
    pub liquidity: Yocto,
    /// The pool cannot fund the requested amount at any price.
    pub insufficient_liquidity: bool,
}

impl DiscountResult {
    /// Whether this result may be applied to a fresh liquidity reading.
    pub fn is_current_for(&self, liquidity: Yocto) -> bool {
        self.liquidity == liquidity
    }

    /// The discount as a percentage label, e.g. `"0.25%"`.
    pub fn percent(&self) -> String {
        format_basis_points(self.basis_points)
    }
}

/// Render basis points as a percentage, trimming trailing zeros
/// (`25` -> `"0.25%"`, `180` -> `"1.8%"`, `200` -> `"2%"`).
pub fn format_basis_points(basis_points: u16) -> String {
    let whole = basis_points / 100;
    let frac = basis_points % 100;
    if frac == 0 {
        format!("{}%", whole)
    } else {
        let frac_str = format!("{:02}", frac);
        format!("{}.{}%", whole, frac_str.trim_end_matches('0'))
    }
}
