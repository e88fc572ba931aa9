//! Currency data types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tillpoint_shared::CurrencyId;

/// A currency as held by the POS.
///
/// `exchange_rate` is expressed relative to whichever currency is currently
/// the default, so the default itself always carries a rate of exactly 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    /// Currency ID.
    pub id: CurrencyId,
    /// Display name (e.g., "Nepalese Rupee").
    pub name: String,
    /// ISO-like code (e.g., "NPR").
    pub code: String,
    /// Display symbol (e.g., "Rs").
    pub symbol: String,
    /// Units of this currency per one unit of the default currency.
    pub exchange_rate: Decimal,
    /// Whether this is the default (base) currency.
    pub is_default: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a currency.
#[derive(Debug, Clone)]
pub struct NewCurrency {
    /// Display name.
    pub name: String,
    /// ISO-like code.
    pub code: String,
    /// Display symbol.
    pub symbol: String,
    /// Rate relative to the current default. Ignored when `is_default` is set.
    pub exchange_rate: Decimal,
    /// Create as the new default currency.
    pub is_default: bool,
}

/// Input for a full update of a currency.
#[derive(Debug, Clone)]
pub struct CurrencyUpdate {
    /// Display name.
    pub name: String,
    /// ISO-like code.
    pub code: String,
    /// Display symbol.
    pub symbol: String,
    /// Rate relative to the current default.
    pub exchange_rate: Decimal,
    /// `Some(true)` promotes the currency (with re-basing), `Some(false)`
    /// is only valid on non-default currencies, `None` leaves the flag alone.
    pub is_default: Option<bool>,
}

/// A single row-level write produced by a currency operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurrencyWrite {
    /// Insert a new row.
    Insert(Currency),
    /// Overwrite an existing row.
    Update(Currency),
    /// Remove a row.
    Delete(CurrencyId),
}

/// Ordered writes that must be applied atomically, plus the record the
/// operation was about.
///
/// Writes that clear a default flag always come before the write that sets
/// one, so a storage-level "single default" constraint holds after every
/// statement.
#[derive(Debug, Clone)]
pub struct ChangeSet {
    /// Writes in application order.
    pub writes: Vec<CurrencyWrite>,
    /// The created, updated, re-based or deleted currency.
    pub subject: Currency,
}

/// Result of converting an amount between two currencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conversion {
    /// Source currency code.
    pub from: String,
    /// Target currency code.
    pub to: String,
    /// Source amount.
    pub amount: Decimal,
    /// Cross rate applied (1 `from` = rate `to`).
    pub rate: Decimal,
    /// Converted amount, banker's-rounded.
    pub converted: Decimal,
}
