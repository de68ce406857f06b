//! Price ladder: conversion between bucket indices and bucket prices.
//!
//! Prices form a geometric sequence with ratio 1.005. Index 4156 is price
//! 1.0, index 0 the highest price and index 7388 the lowest:
//!
//! ```text
//! price(i) = 1.005 ^ (4156 - i)
//! ```
//!
//! Both directions run through the signed 59.18 engine exactly as the pool
//! contracts do, so a bucket derived here is the bucket the contracts derive.

use std::ops::RangeInclusive;

use alloy::primitives::{I256, U256};
use serde::Serialize;
use tracing::{debug, trace};

use crate::error::{MathError, Result};
use crate::sd59x18;
use crate::wad::Wad;
use crate::wad_math::{ceil_wmul, floor_wdiv, HALF_WAD};

/// Highest valid bucket index (lowest price)
pub const MAX_FENWICK_INDEX: u32 = 7388;

/// Ladder exponent at index 0
pub const MAX_BUCKET_INDEX: i64 = 4156;

/// Ladder exponent at index 7388
pub const MIN_BUCKET_INDEX: i64 = -3232;

/// Price of bucket 0: 1_004_968_987.606512354182109771
pub const MAX_PRICE: Wad = Wad::from_atomics(I256::from_raw(U256::from_limbs([
    18_117_966_532_237_924_939,
    54_479_477,
    0,
    0,
])));

/// Price of bucket 7388: 0.00000009983628289
pub const MIN_PRICE: Wad = Wad::from_atomics(I256::from_raw(U256::from_limbs([99_836_282_890, 0, 0, 0])));

/// Ratio between adjacent buckets: 1.005
pub const FLOAT_STEP: Wad = Wad::from_atomics(I256::from_raw(U256::from_limbs([
    1_005_000_000_000_000_000,
    0,
    0,
    0,
])));

/// `log2(1.005)` in 59.18, as computed by the contracts
const LOG2_FLOAT_STEP: u64 = 7_195_501_404_203_907;

fn log2_float_step() -> I256 {
    I256::from_raw(U256::from(LOG2_FLOAT_STEP))
}

/// A bucket on the ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bucket {
    /// Bucket index, 0 is the highest price
    pub index: u32,
    /// Bucket price
    pub price: Wad,
}

impl Bucket {
    /// Look up the bucket at `index`.
    pub fn at(index: u32) -> Result<Self> {
        Ok(Self {
            index,
            price: index_to_price(index)?,
        })
    }

    /// Look up the bucket a price falls into.
    pub fn containing(price: Wad) -> Result<Self> {
        Bucket::at(price_to_index(price)?)
    }
}

/// Price of the bucket at `index`.
///
/// Accepts any integer so that negative indices are rejected rather than
/// unrepresentable. Fails with [`MathError::BucketIndexOutOfBounds`]
/// outside `[0, 7388]`.
pub fn index_to_price(index: impl Into<i64>) -> Result<Wad> {
    let index = index.into();
    let bucket_index = match MAX_BUCKET_INDEX.checked_sub(index) {
        Some(bucket) if (MIN_BUCKET_INDEX..=MAX_BUCKET_INDEX).contains(&bucket) => bucket,
        _ => {
            debug!(index, "bucket index out of bounds");
            return Err(MathError::BucketIndexOutOfBounds(index));
        }
    };

    let exponent = sd59x18::mul(sd59x18::from_int(bucket_index), log2_float_step())?;
    let price = Wad::from_atomics(sd59x18::exp2(exponent)?);

    trace!(index, %price, "index to price");
    Ok(price)
}

/// Index of the bucket a price falls into.
///
/// Prices on a ladder point map to that point. Between two points, positive
/// exponents round up to the higher-priced bucket and negative exponents
/// round to the nearer one, matching the contracts' step function. Fails
/// with [`MathError::BucketPriceOutOfBounds`] outside
/// `[MIN_PRICE, MAX_PRICE]`, which covers every non-positive price.
pub fn price_to_index(price: Wad) -> Result<u32> {
    if !is_price_in_range(price) {
        debug!(%price, "bucket price out of bounds");
        return Err(MathError::BucketPriceOutOfBounds(price));
    }

    let exponent = sd59x18::div(sd59x18::log2(price.atomics())?, log2_float_step())?;
    let ceil_exponent = sd59x18::ceil(exponent)?;
    let whole = sd59x18::to_int(ceil_exponent)?;

    let half = I256::from_raw(HALF_WAD);
    let index = if exponent.is_negative() && ceil_exponent - exponent > half {
        MAX_BUCKET_INDEX + 1 - whole
    } else {
        MAX_BUCKET_INDEX - whole
    };

    let index = u32::try_from(index)
        .ok()
        .filter(|index| *index <= MAX_FENWICK_INDEX)
        .ok_or(MathError::BucketPriceOutOfBounds(price))?;

    check_within_tick(price, index)?;

    trace!(%price, index, "price to index");
    Ok(index)
}

/// The bucket price must sit within one tick of the input price.
fn check_within_tick(price: Wad, index: u32) -> Result<()> {
    let bucket_price = index_to_price(index)?;
    let lower = floor_wdiv(price, FLOAT_STEP)?;
    let upper = ceil_wmul(price, FLOAT_STEP)?;
    if bucket_price < lower || bucket_price > upper {
        debug!(%price, index, %bucket_price, "bucket price drifted beyond one tick");
        return Err(MathError::BucketPriceOutOfBounds(price));
    }
    Ok(())
}

/// Whether a price lies on the ladder's span `[MIN_PRICE, MAX_PRICE]`.
#[inline]
pub fn is_price_in_range(price: Wad) -> bool {
    price >= MIN_PRICE && price <= MAX_PRICE
}

/// Lowest and highest ladder prices.
pub fn price_bounds() -> (Wad, Wad) {
    (MIN_PRICE, MAX_PRICE)
}

/// Bucket indices covering a price band, highest price first.
pub fn bucket_range(min_price: Wad, max_price: Wad) -> Result<RangeInclusive<u32>> {
    if min_price > max_price {
        return Err(MathError::InvalidPriceRange {
            min: min_price,
            max: max_price,
        });
    }
    Ok(price_to_index(max_price)?..=price_to_index(min_price)?)
}

/// Buckets from `from` to `to` inclusive, every `step` indices.
pub fn ladder(from: u32, to: u32, step: u32) -> Result<Vec<Bucket>> {
    if from > MAX_FENWICK_INDEX {
        return Err(MathError::BucketIndexOutOfBounds(from.into()));
    }
    if to > MAX_FENWICK_INDEX {
        return Err(MathError::BucketIndexOutOfBounds(to.into()));
    }
    (from..=to)
        .step_by(step.max(1) as usize)
        .map(Bucket::at)
        .collect()
}
