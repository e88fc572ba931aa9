//! Re-basing exchange rates onto a new default currency.
//!
//! Every rate is stored relative to the default currency. Choosing a new
//! default with old-relative rate `base` turns each rate `r` into `r / base`,
//! which leaves the ratio between any two currencies untouched and gives the
//! new default a rate of exactly 1.

use rust_decimal::{Decimal, RoundingStrategy};

use super::error::CurrencyError;
use super::types::Currency;
use tillpoint_shared::CurrencyId;

/// Significant digits kept for stored exchange rates.
///
/// Rates span many orders of magnitude (BTC against VND, IRR against KWD), so
/// they are rounded by significant digits rather than decimal places.
pub const RATE_SIGNIFICANT_DIGITS: u32 = 20;

/// Rounds a rate to [`RATE_SIGNIFICANT_DIGITS`] using banker's rounding and
/// strips trailing zeros.
#[must_use]
pub fn normalize_rate(rate: Decimal) -> Decimal {
    rate.round_sf_with_strategy(RATE_SIGNIFICANT_DIGITS, RoundingStrategy::MidpointNearestEven)
        .unwrap_or(rate)
        .normalize()
}

/// Expresses `rate` relative to a new base whose old-relative rate is `base`.
///
/// Returns `None` when `base` is zero, the quotient overflows, or a non-zero
/// rate would collapse to zero.
#[must_use]
pub fn rebase_rate(rate: Decimal, base: Decimal) -> Option<Decimal> {
    let rebased = normalize_rate(rate.checked_div(base)?);
    if rebased.is_zero() && !rate.is_zero() {
        return None;
    }
    Some(rebased)
}

/// Re-bases every currency in place so that `target` becomes the default.
///
/// The target's rate is used as divisor for all rows, the target included, so
/// it ends at exactly 1. Nothing is modified when an error is returned.
///
/// # Errors
///
/// - [`CurrencyError::NotFound`] if `target` is not in the slice
/// - [`CurrencyError::ZeroBaseRate`] if the target's rate is zero
/// - [`CurrencyError::RateOutOfRange`] if any quotient is not representable
pub fn rebase_onto(currencies: &mut [Currency], target: CurrencyId) -> Result<(), CurrencyError> {
    let base_currency = currencies
        .iter()
        .find(|c| c.id == target)
        .ok_or(CurrencyError::NotFound(target))?;
    let base = base_currency.exchange_rate;
    if base.is_zero() {
        return Err(CurrencyError::ZeroBaseRate(base_currency.code.clone()));
    }

    // Compute everything first so a failure leaves the slice untouched.
    let rebased = currencies
        .iter()
        .map(|c| rebase_rate(c.exchange_rate, base))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| CurrencyError::RateOutOfRange(base_currency.code.clone()))?;

    for (currency, rate) in currencies.iter_mut().zip(rebased) {
        currency.exchange_rate = rate;
        currency.is_default = currency.id == target;
    }

    Ok(())
}
