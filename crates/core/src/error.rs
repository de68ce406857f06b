//! Error types for fixed-point and ladder math.
//!
//! Every operation in this crate either returns a fully valid value or
//! exactly one of these errors. Nothing is retried: the same input always
//! produces the same outcome.

use alloy::primitives::I256;
use thiserror::Error;

use crate::Wad;

/// Result type alias for ladder math operations.
pub type Result<T> = std::result::Result<T, MathError>;

/// Errors produced by the WAD arithmetic and the price ladder.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MathError {
    // Precision / overflow

    /// An intermediate or final value does not fit the 256-bit domain
    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),

    /// Decimal input carries more than 18 significant fractional digits
    #[error("fractional component of {input:?} exceeds 18 decimals")]
    PrecisionOverflow {
        /// Offending input
        input: String,
    },

    /// `exp2` input at or above 192
    #[error("exp2 input {0} is too big")]
    Exp2InputTooBig(I256),

    // Domain

    /// Malformed decimal string or non-finite number
    #[error("invalid decimal value {input:?}: {reason}")]
    InvalidDecimal {
        /// Offending input
        input: String,
        /// What is wrong with it
        reason: &'static str,
    },

    /// Divisor is zero
    #[error("division by zero")]
    DivisionByZero,

    /// Square root of a negative value
    #[error("square root of negative value {0}")]
    NegativeSqrt(Wad),

    /// `log2` of a non-positive value
    #[error("log2 input {0} must be positive")]
    LogInputTooSmall(I256),

    /// Bucket index outside `[0, 7388]`
    #[error("ERR_BUCKET_INDEX_OUT_OF_BOUNDS: index {0}")]
    BucketIndexOutOfBounds(i64),

    /// Price outside the ladder or non-positive
    #[error("ERR_BUCKET_PRICE_OUT_OF_BOUNDS: price {0}")]
    BucketPriceOutOfBounds(Wad),

    /// Lower bound of a price band above its upper bound
    #[error("min price {min} is above max price {max}")]
    InvalidPriceRange {
        /// Lower bound
        min: Wad,
        /// Upper bound
        max: Wad,
    },
}

impl MathError {
    pub(crate) fn invalid_decimal(input: &str, reason: &'static str) -> Self {
        Self::InvalidDecimal {
            input: input.to_string(),
            reason,
        }
    }

    /// Whether the error comes from caller input rather than representable range.
    pub fn is_domain_error(&self) -> bool {
        !matches!(
            self,
            Self::Overflow(_) | Self::PrecisionOverflow { .. } | Self::Exp2InputTooBig(_)
        )
    }
}
