//! Signed 59.18-decimal fixed-point engine used for the ladder exponent.
//!
//! The pool contracts compute bucket prices with a signed 59.18 fixed-point
//! library (`int256` scaled by 1e18): `log2` by iterative squaring, `exp2`
//! by multiplying binary-fraction magic factors in 192.64 fixed point.
//! This module reproduces those algorithms bit for bit, including the
//! round-half-up in `mul`, the truncation toward zero in `div`, and the
//! saturation of `exp2` to zero for very negative inputs.
//!
//! All loops run a fixed number of times (59 squarings in `log2`, at most
//! 64 factors in `exp2`) regardless of input magnitude.

use alloy::primitives::{Uint, I256, U256};

use crate::error::{MathError, Result};
use crate::wad::signed_from_parts;
use crate::wad_math::{HALF_WAD as HALF_SCALE, WAD as SCALE};

type U512 = Uint<512, 8>;

/// 1e36, the numerator of a fixed-point inversion
const SCALE_SQUARED: U256 = U256::from_limbs([12_919_594_847_110_692_864, 54_210_108_624_275_221, 0, 0]);

/// 2e18
const DOUBLE_SCALE: U256 = U256::from_limbs([2_000_000_000_000_000_000, 0, 0, 0]);

/// 192e18, first input whose power of two leaves the 192.64 format
const EXP2_MAX_INPUT: U256 = U256::from_limbs([7_532_559_262_904_483_840, 10, 0, 0]);

/// Largest exponent magnitude whose inverse power does not truncate to zero
const EXP2_MIN_NEGATIVE_INPUT: u128 = 59_794_705_707_972_522_261;

/// `2^(2^-i) * 2^64` for `i = 1..=64`, rounded to nearest.
const EXP2_FACTORS: [u128; 64] = [
    0x16A09E667F3BCC909,
    0x1306FE0A31B7152DF,
    0x1172B83C7D517ADCE,
    0x10B5586CF9890F62A,
    0x1059B0D31585743AE,
    0x102C9A3E778060EE7,
    0x10163DA9FB33356D8,
    0x100B1AFA5ABCBED61,
    0x10058C86DA1C09EA2,
    0x1002C605E2E8CEC50,
    0x100162F3904051FA1,
    0x1000B175EFFDC76BA,
    0x100058BA01FB9F96D,
    0x10002C5CC37DA9492,
    0x1000162E525EE0547,
    0x10000B17255775C04,
    0x1000058B91B5BC9AE,
    0x100002C5C89D5EC6D,
    0x10000162E43F4F831,
    0x100000B1721BCFC9A,
    0x10000058B90CF1E6E,
    0x1000002C5C863B73F,
    0x100000162E430E5A2,
    0x1000000B172183551,
    0x100000058B90C0B49,
    0x10000002C5C8601CC,
    0x1000000162E42FFF0,
    0x10000000B17217FBB,
    0x1000000058B90BFCE,
    0x100000002C5C85FE3,
    0x10000000162E42FF1,
    0x100000000B17217F8,
    0x10000000058B90BFC,
    0x1000000002C5C85FE,
    0x100000000162E42FF,
    0x1000000000B17217F,
    0x100000000058B90C0,
    0x10000000002C5C860,
    0x1000000000162E430,
    0x10000000000B17218,
    0x1000000000058B90C,
    0x100000000002C5C86,
    0x10000000000162E43,
    0x100000000000B1721,
    0x10000000000058B91,
    0x1000000000002C5C8,
    0x100000000000162E4,
    0x1000000000000B172,
    0x100000000000058B9,
    0x10000000000002C5D,
    0x1000000000000162E,
    0x10000000000000B17,
    0x1000000000000058C,
    0x100000000000002C6,
    0x10000000000000163,
    0x100000000000000B1,
    0x10000000000000059,
    0x1000000000000002C,
    0x10000000000000016,
    0x1000000000000000B,
    0x10000000000000006,
    0x10000000000000003,
    0x10000000000000001,
    0x10000000000000001,
];

#[inline(always)]
fn widen(x: U256) -> U512 {
    let l = x.as_limbs();
    U512::from_limbs([l[0], l[1], l[2], l[3], 0, 0, 0, 0])
}

#[inline(always)]
fn narrow(x: U512) -> Option<U256> {
    let l = x.as_limbs();
    if l[4..].iter().any(|&limb| limb != 0) {
        return None;
    }
    Some(U256::from_limbs([l[0], l[1], l[2], l[3]]))
}

fn low_u64(x: U256) -> Option<u64> {
    let l = x.as_limbs();
    (l[1] == 0 && l[2] == 0 && l[3] == 0).then_some(l[0])
}

/// Convert a whole number to 59.18.
pub fn from_int(value: i64) -> I256 {
    crate::Wad::from_int(value).atomics()
}

/// Whole part, truncated toward zero.
pub fn to_int(x: I256) -> Result<i64> {
    let whole = low_u64(x.unsigned_abs() / SCALE)
        .and_then(|whole| i64::try_from(whole).ok())
        .ok_or(MathError::Overflow("sd59x18 to_int"))?;
    Ok(if x.is_negative() { -whole } else { whole })
}

/// Product rounded half up on the magnitude, computed at 512 bits.
pub fn mul(x: I256, y: I256) -> Result<I256> {
    let product = widen(x.unsigned_abs()) * widen(y.unsigned_abs());
    let scale = widen(SCALE);
    let mut quotient = product / scale;
    if product % scale >= widen(HALF_SCALE) {
        quotient += U512::from(1u8);
    }
    let magnitude = narrow(quotient).ok_or(MathError::Overflow("sd59x18 mul"))?;
    signed_from_parts(x.is_negative() ^ y.is_negative(), magnitude)
}

/// Quotient truncated toward zero, computed at 512 bits.
pub fn div(x: I256, y: I256) -> Result<I256> {
    if y.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    let quotient = widen(x.unsigned_abs()) * widen(SCALE) / widen(y.unsigned_abs());
    let magnitude = narrow(quotient).ok_or(MathError::Overflow("sd59x18 div"))?;
    signed_from_parts(x.is_negative() ^ y.is_negative(), magnitude)
}

/// Smallest whole number not below `x`.
pub fn ceil(x: I256) -> Result<I256> {
    let magnitude = x.unsigned_abs();
    let remainder = magnitude % SCALE;
    if remainder.is_zero() {
        return Ok(x);
    }
    if x.is_negative() {
        signed_from_parts(true, magnitude - remainder)
    } else {
        signed_from_parts(false, magnitude - remainder + SCALE)
    }
}

/// Binary logarithm.
///
/// Inputs below one are inverted first (`log2(x) = -log2(1/x)`). The
/// integer part comes from the most significant bit, the 59 fractional bits
/// from repeated squaring of the normalized mantissa.
pub fn log2(x: I256) -> Result<I256> {
    if x.is_negative() || x.is_zero() {
        return Err(MathError::LogInputTooSmall(x));
    }

    let x = x.into_raw();
    let (negative, x) = if x >= SCALE {
        (false, x)
    } else {
        (true, SCALE_SQUARED / x)
    };

    // x >= SCALE here, so x / SCALE is at least one
    let n = (x / SCALE).bit_len() - 1;
    let mut result = U256::from(n) * SCALE;

    let mut y = x >> n;
    if y == SCALE {
        return signed_from_parts(negative, result);
    }

    let mut delta = HALF_SCALE;
    while !delta.is_zero() {
        y = y * y / SCALE;
        // y^2 in [2, 4) sets this fractional bit
        if y >= DOUBLE_SCALE {
            result += delta;
            y >>= 1usize;
        }
        delta >>= 1usize;
    }

    signed_from_parts(negative, result)
}

/// Binary exponential.
///
/// Negative inputs use `2^-x = 1 / 2^x` and saturate to zero below
/// -59.794705707972522261. Inputs of 192 or more do not fit the 192.64
/// intermediate format.
pub fn exp2(x: I256) -> Result<I256> {
    if x.is_negative() {
        let magnitude = x.unsigned_abs();
        if magnitude > U256::from(EXP2_MIN_NEGATIVE_INPUT) {
            return Ok(I256::ZERO);
        }
        let positive = exp2(I256::from_raw(magnitude))?.into_raw();
        return Ok(I256::from_raw(SCALE_SQUARED / positive));
    }

    let x = x.into_raw();
    if x >= EXP2_MAX_INPUT {
        return Err(MathError::Exp2InputTooBig(I256::from_raw(x)));
    }

    // 192.64 binary fixed point
    let x192x64 = (x << 64usize) / SCALE;
    Ok(I256::from_raw(exp2_binary(x192x64)))
}

/// `2^x` for `x` in 192.64 binary fixed point, returned as 60.18 decimal.
fn exp2_binary(x: U256) -> U256 {
    // Start from 0.5 in 192.64; the integer shift below accounts for it.
    let mut result = U256::from(1u8) << 191usize;

    let fraction = x.as_limbs()[0];
    for (bit, factor) in EXP2_FACTORS.iter().enumerate() {
        if fraction & (1u64 << (63 - bit)) != 0 {
            // result < 2^192 and factor < 2^65, so the product fits
            result = (result * U256::from(*factor)) >> 64usize;
        }
    }

    let integer = x.as_limbs()[1] as usize;
    (result * SCALE) >> (191 - integer)
}
