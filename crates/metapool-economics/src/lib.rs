// crates/metapool-economics/src/lib.rs
//
// metapool-economics: swap discount curve, minimum-amount policies, and
// liquid unstake quotes for the Meta Pool staking engine.
//
// Everything here is synchronous and pure. All monetary values are tracked
// in yocto (1 NEAR = 10^24 yocto) and all rounding is integer floor division.

pub mod deposit;
pub mod fee_curve;
pub mod liquid;
pub mod minimum;

// Re-export key types for ergonomic access from downstream crates.
pub use deposit::{
    check_add_liquidity, check_min_deposit, check_remove_liquidity, max_stakeable,
    min_add_liquidity, STORAGE_RESERVE,
};
pub use fee_curve::{compute_discount, format_basis_points, DiscountCurve, DiscountResult};
pub use liquid::{
    preview_discount, quote_liquid_unstake, DiscountPreview, LiquidUnstakeQuote,
    DEFAULT_SLIPPAGE_BASIS_POINTS,
};
pub use minimum::{MinimumUnstakeGuard, UnstakeRequest, DUST_EPSILON, MIN_UNSTAKE};
