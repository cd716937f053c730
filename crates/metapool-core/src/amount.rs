// crates/metapool-core/src/amount.rs
//
// Fixed-point token amounts.
//
// The smallest unit of NEAR is the "yocto". 1 NEAR = 10^24 yocto.
// Pool balances routinely exceed the 2^53 integer range of an f64, so
// every comparison and fee computation stays in integer yocto.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use crate::error::MetaPoolError;

/// Number of decimal places in one NEAR.
pub const NEAR_DECIMALS: usize = 24;

/// Number of yocto in one NEAR. 1 NEAR = 10^24 yocto.
pub const YOCTO_PER_NEAR: u128 = 1_000_000_000_000_000_000_000_000;

/// 100% expressed in basis points.
pub const BASIS_POINTS_DENOMINATOR: u32 = 10_000;

/// A token amount in yocto.
///
/// Serialized as a decimal string of yocto, the convention the contract
/// uses for `U128` values in JSON.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Yocto(u128);

impl Yocto {
    /// Create an amount from a raw yocto value.
    pub const fn from_yocto(yocto: u128) -> Self {
        Self(yocto)
    }

    /// Create an amount from a whole number of NEAR.
    ///
    /// Saturates at `u128::MAX` yocto for more than about 3.4 * 10^14 NEAR,
    /// far beyond the total NEAR supply.
    pub const fn from_near(near: u64) -> Self {
        Self((near as u128).saturating_mul(YOCTO_PER_NEAR))
    }

    /// Returns zero yocto.
    pub const fn zero() -> Self {
        Self(0)
    }

    /// The raw yocto value.
    pub const fn as_yocto(&self) -> u128 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    /// `self * basis_points / 10000`, floored. Basis points above 10000 are
    /// clamped to 10000.
    pub fn apply_basis_points(self, basis_points: u16) -> Self {
        let bp = u32::from(basis_points).min(BASIS_POINTS_DENOMINATOR);
        // divisor is non-zero and bp <= denominator, so this cannot overflow
        Self(mul_div_floor(self.0, bp, u128::from(BASIS_POINTS_DENOMINATOR)).unwrap_or(self.0))
    }

    /// Parse a decimal amount expressed in whole NEAR (e.g. `"0.5"`,
    /// `"1,250.75"`). The conversion is exact; thousands separators are
    /// ignored.
    ///
    /// # Errors
    /// Returns `MetaPoolError::InvalidAmount` for empty input, signs, non-digit
    /// characters, more than 24 fractional digits, or values above `u128`.
    pub fn parse_near(input: &str) -> Result<Self, MetaPoolError> {
        let cleaned: String = input
            .trim()
            .chars()
            .filter(|c| *c != ',' && *c != '_')
            .collect();

        let (whole, frac) = match cleaned.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (cleaned.as_str(), ""),
        };

        if whole.is_empty() && frac.is_empty() {
            return Err(MetaPoolError::InvalidAmount(format!(
                "'{}' is not a number",
                input
            )));
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MetaPoolError::InvalidAmount(format!(
                "'{}' is not a non-negative decimal amount",
                input
            )));
        }
        if frac.len() > NEAR_DECIMALS {
            return Err(MetaPoolError::InvalidAmount(format!(
                "'{}' has more than {} decimal places",
                input, NEAR_DECIMALS
            )));
        }

        let overflow = || MetaPoolError::InvalidAmount(format!("'{}' is too large", input));

        let whole_units: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| overflow())?
        };
        let frac_units: u128 = if frac.is_empty() {
            0
        } else {
            format!("{:0<width$}", frac, width = NEAR_DECIMALS)
                .parse()
                .map_err(|_| overflow())?
        };

        whole_units
            .checked_mul(YOCTO_PER_NEAR)
            .and_then(|w| w.checked_add(frac_units))
            .map(Self)
            .ok_or_else(overflow)
    }
}

/// Exact `floor(value * numerator / divisor)` without a wide integer type.
///
/// The quotient part `(value / divisor) * numerator` is multiplied directly;
/// the remainder part is accumulated bit by bit with every intermediate kept
/// below `divisor`, so it never overflows. Returns `None` when `divisor` is
/// zero or the result does not fit in a `u128`.
pub fn mul_div_floor(value: u128, numerator: u32, divisor: u128) -> Option<u128> {
    if divisor == 0 {
        return None;
    }
    let whole = (value / divisor).checked_mul(u128::from(numerator))?;
    let rem_value = value % divisor;

    // Invariant: quotient * divisor + rem == (bits of numerator seen) * rem_value, rem < divisor.
    let mut quotient: u128 = 0;
    let mut rem: u128 = 0;
    for bit in (0..u32::BITS).rev() {
        quotient <<= 1;
        if rem >= divisor - rem {
            rem -= divisor - rem;
            quotient += 1;
        } else {
            rem += rem;
        }

        if (numerator >> bit) & 1 == 1 {
            if rem >= divisor - rem_value {
                rem -= divisor - rem_value;
                quotient += 1;
            } else {
                rem += rem_value;
            }
        }
    }

    whole.checked_add(quotient)
}

impl Add for Yocto {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Yocto {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self.saturating_sub(rhs)
    }
}

impl FromStr for Yocto {
    type Err = MetaPoolError;

    /// Parses whole-NEAR decimal notation. Use `Yocto::try_from(String)` for
    /// raw yocto strings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_near(s)
    }
}

impl TryFrom<String> for Yocto {
    type Error = MetaPoolError;

    /// Parses a raw yocto decimal string, as found in contract JSON.
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.trim().parse::<u128>().map(Self).map_err(|e| {
            MetaPoolError::InvalidAmount(format!("'{}' is not a yocto amount: {}", value, e))
        })
    }
}

impl From<Yocto> for String {
    fn from(value: Yocto) -> Self {
        value.0.to_string()
    }
}

impl fmt::Display for Yocto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / YOCTO_PER_NEAR;
        let frac = self.0 % YOCTO_PER_NEAR;
        if frac == 0 {
            write!(f, "{} NEAR", whole)
        } else {
            let frac_str = format!("{:0width$}", frac, width = NEAR_DECIMALS);
            let trimmed = frac_str.trim_end_matches('0');
            write!(f, "{}.{} NEAR", whole, trimmed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yocto_per_near() {
        assert_eq!(YOCTO_PER_NEAR, 10u128.pow(24));
        assert_eq!(Yocto::from_near(3).as_yocto(), 3 * YOCTO_PER_NEAR);
    }

    #[test]
    fn test_from_near_saturates_past_u128() {
        let largest = 340_282_366_920_938;
        assert_eq!(
            Yocto::from_near(largest).as_yocto(),
            largest as u128 * YOCTO_PER_NEAR
        );
        assert_eq!(Yocto::from_near(largest + 1), Yocto::from_yocto(u128::MAX));
        assert_eq!(Yocto::from_near(u64::MAX), Yocto::from_yocto(u128::MAX));
    }

    #[test]
    fn test_parse_near_exact() {
        assert_eq!(
            Yocto::parse_near("0.5").unwrap().as_yocto(),
            YOCTO_PER_NEAR / 2
        );
        assert_eq!(
            Yocto::parse_near("0.0000001").unwrap().as_yocto(),
            100_000_000_000_000_000
        );
        assert_eq!(
            Yocto::parse_near("1,250.75").unwrap().as_yocto(),
            1_250 * YOCTO_PER_NEAR + 3 * YOCTO_PER_NEAR / 4
        );
        assert_eq!(Yocto::parse_near(".25").unwrap().as_yocto(), YOCTO_PER_NEAR / 4);
        assert_eq!(Yocto::parse_near("7.").unwrap(), Yocto::from_near(7));
    }

    #[test]
    fn test_parse_near_rejects_garbage() {
        assert!(Yocto::parse_near("").is_err());
        assert!(Yocto::parse_near(".").is_err());
        assert!(Yocto::parse_near("-1").is_err());
        assert!(Yocto::parse_near("1e3").is_err());
        assert!(Yocto::parse_near("0.0000000000000000000000001").is_err());
        assert!(Yocto::parse_near("999999999999999999999999999999").is_err());
    }

    #[test]
    fn test_serde_as_yocto_string() {
        let amount = Yocto::from_yocto(1_500);
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "\"1500\"");
        let back: Yocto = serde_json::from_str("\"1000000000000000000000000\"").unwrap();
        assert_eq!(back, Yocto::from_near(1));
        assert!(serde_json::from_str::<Yocto>("\"abc\"").is_err());
    }

    #[test]
    fn test_sub_saturating() {
        let c = Yocto::from_near(1) - Yocto::from_near(2);
        assert!(c.is_zero());
    }

    #[test]
    fn test_display() {
        assert_eq!(Yocto::from_near(42).to_string(), "42 NEAR");
        assert_eq!(Yocto::parse_near("1.5").unwrap().to_string(), "1.5 NEAR");
        assert_eq!(Yocto::zero().to_string(), "0 NEAR");
        assert_eq!(Yocto::from_yocto(1).to_string(), "0.000000000000000000000001 NEAR");
    }

    #[test]
    fn test_mul_div_floor_small_values() {
        assert_eq!(mul_div_floor(300, 2000, 500), Some(1200));
        assert_eq!(mul_div_floor(7, 3, 2), Some(10));
        assert_eq!(mul_div_floor(0, 9999, 17), Some(0));
        assert_eq!(mul_div_floor(5, 0, 17), Some(0));
        assert_eq!(mul_div_floor(5, 1, 0), None);
    }

    #[test]
    fn test_mul_div_floor_beyond_u128_product() {
        // value * numerator overflows u128, the quotient does not.
        let value = u128::MAX / 3;
        assert_eq!(mul_div_floor(value, 10_000, u128::MAX), Some(3_333));
        assert_eq!(mul_div_floor(u128::MAX - 1, 10_000, u128::MAX), Some(9_999));
    }

    #[test]
    fn test_mul_div_floor_overflowing_result() {
        assert_eq!(mul_div_floor(u128::MAX, 2, 1), None);
    }

    #[test]
    fn test_apply_basis_points() {
        let amount = Yocto::from_near(100);
        assert_eq!(amount.apply_basis_points(250), Yocto::parse_near("2.5").unwrap());
        assert_eq!(amount.apply_basis_points(10_000), amount);
        assert_eq!(amount.apply_basis_points(60_000), amount);
        assert_eq!(Yocto::from_yocto(3).apply_basis_points(5_000), Yocto::from_yocto(1));
    }
}
