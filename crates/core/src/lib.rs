//! Ladder core logic.
//!
//! This crate provides the numeric engine behind a bucket-based lending pool
//! client:
//! - WAD (1e18) fixed-point values with exact decimal conversion
//! - WAD multiply/divide/sqrt with the pool contracts' rounding
//! - Signed 59.18 log2/exp2 engine
//! - Bucket index <-> price ladder with bounds validation
//! - Offline position estimates (threshold price, kickability)
//!
//! Everything is pure and synchronous; no network access, no shared state.

mod error;
pub mod estimates;
pub mod pricing;
pub mod sd59x18;
mod wad;
pub mod wad_math;

pub use error::{MathError, Result};
pub use estimates::{is_kickable, lp_to_quote, reserve_auction_burn, threshold_price};
pub use pricing::{
    bucket_range, index_to_price, ladder, price_bounds, price_to_index, Bucket, FLOAT_STEP,
    MAX_FENWICK_INDEX, MAX_PRICE, MIN_PRICE,
};
pub use wad::{from_wad, to_wad, IntoWad, Wad, WAD_DECIMALS};
pub use wad_math::{
    ceil_wdiv, ceil_wmul, floor_wdiv, floor_wmul, max, min, wdiv, wmul, wsqrt, Rounding, WAD,
};
