//! Offline position estimates built on WAD math.
//!
//! These mirror values the pool contracts compute, so that a client can
//! decide whether a kick or a withdrawal makes sense before submitting it.
//! Inputs come from contract state read elsewhere.

use crate::error::Result;
use crate::wad::Wad;
use crate::wad_math::{wdiv, wmul};

/// Threshold price of a loan: debt per unit of collateral.
/// Zero when there is no collateral.
pub fn threshold_price(debt: Wad, collateral: Wad) -> Result<Wad> {
    if collateral.is_zero() {
        return Ok(Wad::ZERO);
    }
    wdiv(debt, collateral)
}

/// A loan can be kicked once the lowest utilized price drops to its
/// threshold price.
pub fn is_kickable(lup: Wad, debt: Wad, collateral: Wad) -> Result<bool> {
    Ok(lup <= threshold_price(debt, collateral)?)
}

/// Quote token redeemable for an LP balance at the bucket exchange rate.
///
/// The exchange rate can move before the transaction lands, so this is an
/// estimate.
pub fn lp_to_quote(lp_balance: Wad, exchange_rate: Wad) -> Result<Wad> {
    wmul(lp_balance, exchange_rate)
}

/// Amount of the protocol token burned to take the remaining claimable
/// reserves at the current auction price.
pub fn reserve_auction_burn(claimable_remaining: Wad, auction_price: Wad) -> Result<Wad> {
    wmul(claimable_remaining, auction_price)
}
