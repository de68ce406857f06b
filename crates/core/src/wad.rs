//! WAD fixed-point value type and decimal conversions.
//!
//! A [`Wad`] is a signed 256-bit integer scaled by 10^18. Parsing follows the
//! client library's `toWad` rules exactly: trailing fractional zeros are
//! ignored, anything beyond 18 significant fractional digits is rejected
//! rather than rounded. Formatting keeps at least one fractional digit
//! (`765.0`), the way the client library prints ether amounts.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::{I256, U256};
use serde::{Deserialize, Serialize};

use crate::error::{MathError, Result};
use crate::wad_math::{pow10, WAD};

/// Number of fractional decimal digits carried by a [`Wad`].
pub const WAD_DECIMALS: u8 = 18;

/// Signed fixed-point decimal scaled by 10^18.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Wad(I256);

impl Wad {
    pub const ZERO: Self = Self(I256::ZERO);
    pub const ONE: Self = Self(I256::from_raw(WAD));

    /// Wrap a raw scaled integer.
    #[inline(always)]
    pub const fn from_atomics(atomics: I256) -> Self {
        Self(atomics)
    }

    /// The raw scaled integer.
    #[inline(always)]
    pub const fn atomics(self) -> I256 {
        self.0
    }

    /// Wrap an unsigned raw scaled integer, e.g. a `uint256` read from a contract.
    pub fn from_u256(atomics: U256) -> Result<Self> {
        signed_from_parts(false, atomics).map(Self)
    }

    /// The raw scaled integer as `uint256`, `None` when negative.
    pub fn to_u256(self) -> Option<U256> {
        (!self.0.is_negative()).then(|| self.0.into_raw())
    }

    /// Scale a whole number by 10^18.
    pub fn from_int(value: i64) -> Self {
        let magnitude = U256::from(value.unsigned_abs()) * WAD;
        if value < 0 {
            Self(I256::from_raw(magnitude.wrapping_neg()))
        } else {
            Self(I256::from_raw(magnitude))
        }
    }

    /// Convert a number through its shortest round-trip decimal rendering.
    pub fn from_f64(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(MathError::invalid_decimal(&value.to_string(), "not a finite number"));
        }
        format!("{value}").parse()
    }

    /// Parse raw atomics given as a decimal integer or a `0x` hex integer.
    pub fn from_atomics_str(input: &str) -> Result<Self> {
        if let Some(hex) = input.strip_prefix("0x").or_else(|| input.strip_prefix("0X")) {
            let value = U256::from_str_radix(hex, 16)
                .map_err(|_| MathError::invalid_decimal(input, "invalid hex integer"))?;
            return Self::from_u256(value);
        }

        let (negative, digits) = split_sign(input);
        if digits.is_empty() {
            return Err(MathError::invalid_decimal(input, "missing value"));
        }
        let magnitude = parse_digits(digits, input)?;
        signed_from_parts(negative, magnitude).map(Self)
    }

    #[inline(always)]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    #[inline(always)]
    pub fn is_negative(self) -> bool {
        self.0.is_negative()
    }

    #[inline(always)]
    pub fn is_positive(self) -> bool {
        !self.0.is_negative() && !self.0.is_zero()
    }

    /// Absolute value of the raw scaled integer.
    #[inline(always)]
    pub fn magnitude(self) -> U256 {
        self.0.unsigned_abs()
    }

    /// Whole part, truncated toward zero.
    pub fn trunc(self) -> Self {
        let magnitude = self.magnitude();
        let whole = magnitude - magnitude % WAD;
        // Truncating can only shrink the magnitude, so this always fits.
        Self(signed_from_parts(self.is_negative(), whole).unwrap_or(self.0))
    }
}

/// Build a signed integer from a sign flag and a magnitude.
pub(crate) fn signed_from_parts(negative: bool, magnitude: U256) -> Result<I256> {
    let limit = I256::MAX.into_raw();
    if negative {
        // |int256.min| is one larger than int256.max
        if magnitude > limit + U256::from(1u8) {
            return Err(MathError::Overflow("int256 conversion"));
        }
        Ok(I256::from_raw(magnitude.wrapping_neg()))
    } else {
        if magnitude > limit {
            return Err(MathError::Overflow("int256 conversion"));
        }
        Ok(I256::from_raw(magnitude))
    }
}

fn split_sign(input: &str) -> (bool, &str) {
    match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input),
    }
}

/// Accumulate a run of ASCII digits; an empty run is zero.
fn parse_digits(digits: &str, input: &str) -> Result<U256> {
    let ten = U256::from(10u8);
    digits.bytes().try_fold(U256::ZERO, |acc, byte| {
        if !byte.is_ascii_digit() {
            return Err(MathError::invalid_decimal(input, "invalid character"));
        }
        acc.checked_mul(ten)
            .and_then(|acc| acc.checked_add(U256::from(byte - b'0')))
            .ok_or(MathError::Overflow("decimal parse"))
    })
}

impl FromStr for Wad {
    type Err = MathError;

    /// Accepts `"1.23"`, `"1"`, `".5"`, `"-0.25"`, `"1.000000000000000000000"`.
    /// Rejects `""`, `"."`, `"-"`, `"1.2.3"` and more than 18 significant
    /// fractional digits. Never rounds.
    fn from_str(input: &str) -> Result<Self> {
        let (negative, body) = split_sign(input);
        if body.is_empty() || body == "." {
            return Err(MathError::invalid_decimal(input, "missing value"));
        }

        let mut parts = body.split('.');
        let whole = parts.next().unwrap_or_default();
        let fraction = parts.next().unwrap_or_default();
        if parts.next().is_some() {
            return Err(MathError::invalid_decimal(input, "too many decimal points"));
        }

        let fraction = fraction.trim_end_matches('0');
        if fraction.len() > WAD_DECIMALS as usize {
            return Err(MathError::PrecisionOverflow {
                input: input.to_string(),
            });
        }

        let whole = parse_digits(whole, input)?
            .checked_mul(WAD)
            .ok_or(MathError::Overflow("decimal parse"))?;
        let fraction = parse_digits(fraction, input)?
            * pow10(WAD_DECIMALS - fraction.len() as u8)?;

        let magnitude = whole
            .checked_add(fraction)
            .ok_or(MathError::Overflow("decimal parse"))?;

        signed_from_parts(negative, magnitude).map(Self)
    }
}

impl fmt::Display for Wad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let magnitude = self.magnitude();
        let whole = magnitude / WAD;
        let fraction = format!("{:0>18}", (magnitude % WAD).to_string());
        let fraction = fraction.trim_end_matches('0');

        if self.is_negative() {
            f.write_str("-")?;
        }
        if fraction.is_empty() {
            write!(f, "{whole}.0")
        } else {
            write!(f, "{whole}.{fraction}")
        }
    }
}

impl TryFrom<String> for Wad {
    type Error = MathError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Wad> for String {
    fn from(value: Wad) -> Self {
        value.to_string()
    }
}

/// Values that can be scaled into a [`Wad`].
pub trait IntoWad {
    fn into_wad(self) -> Result<Wad>;
}

impl IntoWad for Wad {
    fn into_wad(self) -> Result<Wad> {
        Ok(self)
    }
}

impl IntoWad for &str {
    fn into_wad(self) -> Result<Wad> {
        self.parse()
    }
}

impl IntoWad for String {
    fn into_wad(self) -> Result<Wad> {
        self.parse()
    }
}

impl IntoWad for f64 {
    fn into_wad(self) -> Result<Wad> {
        Wad::from_f64(self)
    }
}

macro_rules! impl_into_wad_int {
    ($($t:ty),*) => {
        $(
            impl IntoWad for $t {
                fn into_wad(self) -> Result<Wad> {
                    Ok(Wad::from_int(i64::from(self)))
                }
            }
        )*
    };
}

impl_into_wad_int!(i8, i16, i32, i64, u8, u16, u32);

impl IntoWad for u64 {
    fn into_wad(self) -> Result<Wad> {
        let magnitude = U256::from(self) * WAD;
        Wad::from_u256(magnitude)
    }
}

/// Scale a human-readable decimal (string, number or integer) to WAD.
pub fn to_wad(value: impl IntoWad) -> Result<Wad> {
    value.into_wad()
}

/// Canonical decimal rendering of a WAD value.
pub fn from_wad(value: Wad) -> String {
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn atomics(value: u128) -> Wad {
        Wad::from_u256(U256::from(value)).unwrap()
    }

    #[test]
    fn test_to_wad_string_and_number_agree() {
        let expected = Wad::from_atomics_str("0x61518f81f58107400").unwrap();
        assert_eq!(to_wad("112.20070213").unwrap(), expected);
        assert_eq!(to_wad(112.20070213).unwrap(), expected);
        assert_eq!(expected, atomics(112_200_702_130_000_000_000));
    }

    #[test]
    fn test_from_wad() {
        let value = Wad::from_atomics_str("112200702130000000000").unwrap();
        assert_eq!(from_wad(value), "112.20070213");
    }

    #[test_case("1", 1_000_000_000_000_000_000 ; "whole")]
    #[test_case("1.53", 1_530_000_000_000_000_000 ; "fraction")]
    #[test_case(".5", 500_000_000_000_000_000 ; "empty whole")]
    #[test_case("7.", 7_000_000_000_000_000_000 ; "empty fraction")]
    #[test_case("0.000000000000000001", 1 ; "one atomic")]
    #[test_case("1.00000000000000000", 1_000_000_000_000_000_000 ; "padded one")]
    #[test_case("2.5000000000000000000000", 2_500_000_000_000_000_000 ; "trailing zeros past 18")]
    #[test_case("000012", 12_000_000_000_000_000_000 ; "leading zeros")]
    fn test_parse(input: &str, expected: u128) {
        assert_eq!(input.parse::<Wad>().unwrap(), atomics(expected));
    }

    #[test]
    fn test_parse_negative() {
        let value: Wad = "-0.25".parse().unwrap();
        assert!(value.is_negative());
        assert_eq!(value.magnitude(), U256::from(250_000_000_000_000_000u64));
        assert_eq!(value.to_string(), "-0.25");
        assert_eq!(value.to_u256(), None);
    }

    #[test]
    fn test_precision_overflow() {
        let err = "0.0000000000000000001".parse::<Wad>().unwrap_err();
        assert_eq!(
            err,
            MathError::PrecisionOverflow {
                input: "0.0000000000000000001".into()
            }
        );
    }

    #[test_case("" ; "empty")]
    #[test_case("." ; "dot")]
    #[test_case("-" ; "sign only")]
    #[test_case("1.2.3" ; "two dots")]
    #[test_case("1e5" ; "exponent")]
    #[test_case("12a" ; "letter")]
    #[test_case("+1" ; "plus sign")]
    fn test_parse_invalid(input: &str) {
        assert!(matches!(
            input.parse::<Wad>(),
            Err(MathError::InvalidDecimal { .. })
        ));
    }

    #[test]
    fn test_parse_overflow() {
        // 10^59 * 10^18 exceeds int256
        let input = format!("1{}", "0".repeat(59));
        assert!(matches!(input.parse::<Wad>(), Err(MathError::Overflow(_))));
    }

    #[test_case(765_000_000_000_000_000_000, "765.0")]
    #[test_case(0, "0.0")]
    #[test_case(1, "0.000000000000000001")]
    #[test_case(1_004_968_987_606_512_354_182_109_771, "1004968987.606512354182109771")]
    #[test_case(99_836_282_890, "0.00000009983628289")]
    fn test_display(value: u128, expected: &str) {
        assert_eq!(atomics(value).to_string(), expected);
    }

    #[test]
    fn test_from_f64() {
        assert_eq!(Wad::from_f64(0.5).unwrap(), to_wad("0.5").unwrap());
        assert_eq!(Wad::from_f64(-3.0).unwrap(), Wad::from_int(-3));
        assert!(Wad::from_f64(f64::NAN).is_err());
        assert!(Wad::from_f64(f64::INFINITY).is_err());
    }

    #[test]
    fn test_integer_conversions() {
        assert_eq!(to_wad(500).unwrap(), to_wad("500").unwrap());
        assert_eq!(to_wad(8u64).unwrap(), Wad::from_int(8));
        assert_eq!(Wad::from_int(1), Wad::ONE);
        assert_eq!(Wad::from_int(-2).to_string(), "-2.0");
    }

    #[test]
    fn test_trunc() {
        assert_eq!(to_wad("3.99").unwrap().trunc(), Wad::from_int(3));
        assert_eq!(to_wad("-3.99").unwrap().trunc(), Wad::from_int(-3));
    }

    #[test]
    fn test_serde_as_decimal_string() {
        let value = to_wad("2000.221618840727700609").unwrap();
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, "\"2000.221618840727700609\"");
        let back: Wad = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
        assert!(serde_json::from_str::<Wad>("\"1.2.3\"").is_err());
    }

    #[test]
    fn test_ordering() {
        assert!(to_wad("-1").unwrap() < Wad::ZERO);
        assert!(to_wad("38.062").unwrap() > to_wad("22.6845977").unwrap());
    }
}
