//! Currency conversion logic.
//!
//! CRITICAL: Rounding strategy for multi-currency:
//! - Rates are stored relative to the default currency, so converting between
//!   two non-default currencies goes through the cross rate `to / from`
//! - Use banker's rounding (round half to even)

use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;

/// Decimal places kept for converted amounts.
pub const AMOUNT_SCALE: u32 = 4;

/// Converts an amount using the given exchange rate.
///
/// Uses banker's rounding (round half to even) to minimize cumulative errors.
#[must_use]
pub fn convert_amount(amount: Decimal, rate: Decimal, decimal_places: u32) -> Decimal {
    let converted = amount * rate;
    converted.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointNearestEven)
}

/// Cross rate between two default-relative rates: 1 `from` = result `to`.
///
/// Returns `None` if `from_rate` is zero.
#[must_use]
pub fn cross_rate(from_rate: Decimal, to_rate: Decimal) -> Option<Decimal> {
    to_rate.checked_div(from_rate)
}
