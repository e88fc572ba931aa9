//! Multi-currency handling: the currency book, re-basing and conversion.

pub mod book;
pub mod conversion;
pub mod error;
pub mod rebase;
pub mod types;

#[cfg(test)]
mod props;

pub use book::{CurrencyBook, normalize_code};
pub use conversion::convert_amount;
pub use error::CurrencyError;
pub use rebase::{RATE_SIGNIFICANT_DIGITS, normalize_rate, rebase_onto};
pub use types::{ChangeSet, Conversion, Currency, CurrencyUpdate, CurrencyWrite, NewCurrency};
