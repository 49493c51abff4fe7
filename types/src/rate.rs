//! Fixed-point interest rates.
//!
//! A rate is a fraction per second scaled by [`PRECISION`]: `Rate::from_raw(PRECISION)`
//! means the balance grows by 100% of principal every second, `PRECISION / 2` by 50%.
//! Integer arithmetic only, so every node computes identical balances.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Fixed-point scaling factor for rates and accrual factors (1e18).
pub const PRECISION: u128 = 1_000_000_000_000_000_000;

/// Number of decimal digits carried by [`PRECISION`].
const PRECISION_DIGITS: usize = 18;

/// A per-second rate scaled by [`PRECISION`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rate(u128);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RateParseError {
    #[error("rate string is empty")]
    Empty,

    #[error("invalid character in rate: {0:?}")]
    InvalidDigit(char),

    #[error("rate has more than {PRECISION_DIGITS} fractional digits")]
    TooPrecise,

    #[error("rate does not fit in 128 bits")]
    Overflow,
}

impl Rate {
    pub const ZERO: Self = Self(0);

    /// One whole unit per second (100%).
    pub const ONE: Self = Self(PRECISION);

    pub fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Parse a plain decimal such as `"0.5"` or `"0.000000003"` into a scaled rate.
    pub fn from_decimal_str(s: &str) -> Result<Self, RateParseError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(RateParseError::Empty);
        }
        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(RateParseError::Empty);
        }
        if frac.len() > PRECISION_DIGITS {
            return Err(RateParseError::TooPrecise);
        }

        let whole_units = parse_digits(whole)?;
        let mut frac_units = parse_digits(frac)?;
        for _ in frac.len()..PRECISION_DIGITS {
            frac_units = frac_units.checked_mul(10).ok_or(RateParseError::Overflow)?;
        }

        whole_units
            .checked_mul(PRECISION)
            .and_then(|w| w.checked_add(frac_units))
            .map(Self)
            .ok_or(RateParseError::Overflow)
    }
}

/// Compute `a * b / PRECISION` (floor) without a 256-bit intermediate.
///
/// Splits both operands at `PRECISION`; every partial product fits in 128 bits
/// unless the final result itself does not, in which case `None` is returned.
pub fn mul_div_precision(a: u128, b: u128) -> Option<u128> {
    let (a_hi, a_lo) = (a / PRECISION, a % PRECISION);
    let (b_hi, b_lo) = (b / PRECISION, b % PRECISION);
    a_hi.checked_mul(b_hi)?
        .checked_mul(PRECISION)?
        .checked_add(a_hi.checked_mul(b_lo)?)?
        .checked_add(a_lo.checked_mul(b_hi)?)?
        .checked_add(a_lo * b_lo / PRECISION)
}

fn parse_digits(digits: &str) -> Result<u128, RateParseError> {
    let mut value: u128 = 0;
    for c in digits.chars() {
        let d = c.to_digit(10).ok_or(RateParseError::InvalidDigit(c))?;
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(d as u128))
            .ok_or(RateParseError::Overflow)?;
    }
    Ok(value)
}

impl FromStr for Rate {
    type Err = RateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_decimal_str(s)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / PRECISION;
        let frac = self.0 % PRECISION;
        if frac == 0 {
            return write!(f, "{}", whole);
        }
        let digits = format!("{:0width$}", frac, width = PRECISION_DIGITS);
        write!(f, "{}.{}", whole, digits.trim_end_matches('0'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_half() {
        let r = Rate::from_decimal_str("0.5").unwrap();
        assert_eq!(r.raw(), PRECISION / 2);
    }

    #[test]
    fn parse_whole_and_fraction() {
        assert_eq!("2".parse::<Rate>().unwrap().raw(), 2 * PRECISION);
        assert_eq!("1.25".parse::<Rate>().unwrap().raw(), PRECISION + PRECISION / 4);
        assert_eq!(".000000000000000001".parse::<Rate>().unwrap().raw(), 1);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(Rate::from_decimal_str(""), Err(RateParseError::Empty));
        assert_eq!(Rate::from_decimal_str("."), Err(RateParseError::Empty));
        assert_eq!(Rate::from_decimal_str("1e5"), Err(RateParseError::InvalidDigit('e')));
        assert_eq!(
            Rate::from_decimal_str("0.0000000000000000001"),
            Err(RateParseError::TooPrecise)
        );
        assert_eq!(
            Rate::from_decimal_str("999999999999999999999999"),
            Err(RateParseError::Overflow)
        );
    }

    #[test]
    fn display_trims_trailing_zeros() {
        assert_eq!(Rate::from_raw(PRECISION / 2).to_string(), "0.5");
        assert_eq!(Rate::from_raw(3 * PRECISION).to_string(), "3");
        assert_eq!(Rate::from_raw(1).to_string(), "0.000000000000000001");
        assert_eq!(Rate::ZERO.to_string(), "0");
    }

    #[test]
    fn mul_div_matches_naive_when_small() {
        assert_eq!(mul_div_precision(10, 2 * PRECISION), Some(20));
        assert_eq!(mul_div_precision(7, PRECISION / 2), Some(3));
        assert_eq!(mul_div_precision(3 * PRECISION + 1, 5), Some(15));
    }

    #[test]
    fn mul_div_handles_products_wider_than_u128() {
        // 1e30 * 1e20 overflows u128, the scaled result (1e32) does not.
        let a = 1_000_000_000_000_000_000_000_000_000_000u128;
        let b = 100 * PRECISION;
        assert_eq!(mul_div_precision(a, b), Some(a * 100));
        assert_eq!(mul_div_precision(u128::MAX, 2 * PRECISION), None);
    }

    #[test]
    fn ordering_follows_raw_value() {
        assert!(Rate::from_raw(1) < Rate::from_raw(2));
        assert!(Rate::ZERO < Rate::ONE);
    }
}
