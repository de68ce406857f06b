//! WAD arithmetic matching the lending pool's `Maths` library.
//!
//! The protocol computes `wmul` as `(x * y + WAD / 2) / WAD` and `wdiv` as
//! `(x * WAD + y / 2) / y` on `uint256`, reverting when the intermediate
//! product overflows. The functions here reproduce those expressions
//! literally, including the 256-bit overflow point, so that a value accepted
//! locally is accepted on-chain.
//!
//! Every rounding decision goes through [`mul_div`] and a named
//! [`Rounding`] mode. Signed operands are rounded on their magnitude and the
//! sign is applied afterwards.

use alloy::primitives::U256;

use crate::error::{MathError, Result};
use crate::wad::{signed_from_parts, Wad};

/// WAD constant: 1e18 for 18-decimal fixed-point arithmetic
pub const WAD: U256 = U256::from_limbs([1_000_000_000_000_000_000u64, 0, 0, 0]);

/// Half a WAD, the round-half-up bias
pub const HALF_WAD: U256 = U256::from_limbs([500_000_000_000_000_000u64, 0, 0, 0]);

/// Pre-computed powers of 10 for fast decimal conversion
const POW10: [u128; 39] = [
    1,
    10,
    100,
    1_000,
    10_000,
    100_000,
    1_000_000,
    10_000_000,
    100_000_000,
    1_000_000_000,
    10_000_000_000,
    100_000_000_000,
    1_000_000_000_000,
    10_000_000_000_000,
    100_000_000_000_000,
    1_000_000_000_000_000,
    10_000_000_000_000_000,
    100_000_000_000_000_000,
    1_000_000_000_000_000_000,
    10_000_000_000_000_000_000,
    100_000_000_000_000_000_000,
    1_000_000_000_000_000_000_000,
    10_000_000_000_000_000_000_000,
    100_000_000_000_000_000_000_000,
    1_000_000_000_000_000_000_000_000,
    10_000_000_000_000_000_000_000_000,
    100_000_000_000_000_000_000_000_000,
    1_000_000_000_000_000_000_000_000_000,
    10_000_000_000_000_000_000_000_000_000,
    100_000_000_000_000_000_000_000_000_000,
    1_000_000_000_000_000_000_000_000_000_000,
    10_000_000_000_000_000_000_000_000_000_000,
    100_000_000_000_000_000_000_000_000_000_000,
    1_000_000_000_000_000_000_000_000_000_000_000,
    10_000_000_000_000_000_000_000_000_000_000_000,
    100_000_000_000_000_000_000_000_000_000_000_000,
    1_000_000_000_000_000_000_000_000_000_000_000_000,
    10_000_000_000_000_000_000_000_000_000_000_000_000,
    100_000_000_000_000_000_000_000_000_000_000_000_000,
];

/// Power of 10 lookup, table-backed up to 10^38.
#[inline(always)]
pub fn pow10(exp: u8) -> Result<U256> {
    if exp < 39 {
        Ok(U256::from(POW10[exp as usize]))
    } else {
        U256::from(10u64)
            .checked_pow(U256::from(exp))
            .ok_or(MathError::Overflow("pow10"))
    }
}

/// Rounding applied to the quotient of a fixed-point product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Truncate (`floorWmul`, `floorWdiv`)
    Floor,
    /// Add half the divisor before truncating (`wmul`, `wdiv`)
    HalfUp,
    /// Add the divisor minus one before truncating (`ceilWmul`, `ceilWdiv`)
    Ceil,
}

impl Rounding {
    fn bias(self, denominator: U256) -> U256 {
        match self {
            Rounding::Floor => U256::ZERO,
            Rounding::HalfUp => denominator / U256::from(2u8),
            Rounding::Ceil => denominator - U256::from(1u8),
        }
    }
}

/// `(a * b + bias) / denominator` on `uint256`, the bias chosen by `rounding`.
///
/// Both the product and the biased product must fit 256 bits.
pub fn mul_div_u256(a: U256, b: U256, denominator: U256, rounding: Rounding) -> Result<U256> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    let product = a.checked_mul(b).ok_or(MathError::Overflow("mul_div"))?;
    let biased = product
        .checked_add(rounding.bias(denominator))
        .ok_or(MathError::Overflow("mul_div"))?;
    Ok(biased / denominator)
}

/// Signed `a * b / denominator` rounded on the magnitude.
pub fn mul_div(a: Wad, b: Wad, denominator: Wad, rounding: Rounding) -> Result<Wad> {
    let negative = a.is_negative() ^ b.is_negative() ^ denominator.is_negative();
    let magnitude = mul_div_u256(
        a.magnitude(),
        b.magnitude(),
        denominator.magnitude(),
        rounding,
    )?;
    signed_from_parts(negative, magnitude).map(Wad::from_atomics)
}

/// Multiply two WAD values: `(a * b + WAD / 2) / WAD`
#[inline]
pub fn wmul(a: Wad, b: Wad) -> Result<Wad> {
    mul_div(a, b, Wad::ONE, Rounding::HalfUp)
}

/// Multiply two WAD values rounding down: `(a * b) / WAD`
#[inline]
pub fn floor_wmul(a: Wad, b: Wad) -> Result<Wad> {
    mul_div(a, b, Wad::ONE, Rounding::Floor)
}

/// Multiply two WAD values rounding up: `(a * b + WAD - 1) / WAD`
#[inline]
pub fn ceil_wmul(a: Wad, b: Wad) -> Result<Wad> {
    mul_div(a, b, Wad::ONE, Rounding::Ceil)
}

/// Divide two WAD values: `(a * WAD + b / 2) / b`
#[inline]
pub fn wdiv(a: Wad, b: Wad) -> Result<Wad> {
    mul_div(a, Wad::ONE, b, Rounding::HalfUp)
}

/// Divide two WAD values rounding down: `(a * WAD) / b`
#[inline]
pub fn floor_wdiv(a: Wad, b: Wad) -> Result<Wad> {
    mul_div(a, Wad::ONE, b, Rounding::Floor)
}

/// Divide two WAD values rounding up: `(a * WAD + b - 1) / b`
#[inline]
pub fn ceil_wdiv(a: Wad, b: Wad) -> Result<Wad> {
    mul_div(a, Wad::ONE, b, Rounding::Ceil)
}

/// Ceiling division of raw integers: `(a + b - 1) / b`
pub fn ceil_div(a: U256, b: U256) -> Result<U256> {
    if b.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    let biased = a
        .checked_add(b - U256::from(1u8))
        .ok_or(MathError::Overflow("ceil_div"))?;
    Ok(biased / b)
}

/// Floor integer square root by Newton's method.
///
/// The starting guess `2^ceil(bits / 2)` is never below the root, so the
/// iteration decreases monotonically and stops at the floor. It converges
/// in at most eight steps over the whole `uint256` domain.
pub fn isqrt(x: U256) -> U256 {
    if x < U256::from(2u8) {
        return x;
    }
    let mut y = U256::from(1u8) << ((x.bit_len() + 1) / 2);
    loop {
        let z = (x / y + y) >> 1usize;
        if z >= y {
            return y;
        }
        y = z;
    }
}

/// Square root of a WAD value: `floor(sqrt(a * WAD))`
pub fn wsqrt(a: Wad) -> Result<Wad> {
    if a.is_negative() {
        return Err(MathError::NegativeSqrt(a));
    }
    let scaled = a
        .magnitude()
        .checked_mul(WAD)
        .ok_or(MathError::Overflow("wsqrt"))?;
    Wad::from_u256(isqrt(scaled))
}

/// Convert a token amount with `decimals` decimals to WAD.
/// Rounds down when `decimals` exceeds 18.
pub fn scale_to_wad(amount: U256, decimals: u8) -> Result<Wad> {
    let scaled = if decimals <= 18 {
        amount
            .checked_mul(pow10(18 - decimals)?)
            .ok_or(MathError::Overflow("scale_to_wad"))?
    } else {
        amount / pow10(decimals - 18)?
    };
    Wad::from_u256(scaled)
}

/// Minimum of two WAD values
#[inline(always)]
pub fn min(a: Wad, b: Wad) -> Wad {
    if a < b {
        a
    } else {
        b
    }
}

/// Maximum of two WAD values
#[inline(always)]
pub fn max(a: Wad, b: Wad) -> Wad {
    if a > b {
        a
    } else {
        b
    }
}
