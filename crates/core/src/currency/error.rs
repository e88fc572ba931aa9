//! Currency error types.

use thiserror::Error;
use tillpoint_shared::{AppError, CurrencyId};

/// Currency-related errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurrencyError {
    /// Currency not found.
    #[error("Currency not found: {0}")]
    NotFound(CurrencyId),

    /// No currency carries the given code.
    #[error("Currency with code '{0}' not found")]
    UnknownCode(String),

    /// The default currency cannot be deleted.
    #[error("Cannot delete the default currency {0}; set another default first")]
    DefaultDeletion(String),

    /// The default flag cannot be removed without choosing another default.
    #[error("Cannot unset default on {0}; set another currency as default instead")]
    DefaultUnset(String),

    /// Another request set a different default at the same time.
    #[error("Currency {0} could not become the default; another default was set concurrently")]
    DefaultTaken(String),

    /// Another currency already uses this code.
    #[error("Currency code '{0}' already exists")]
    DuplicateCode(String),

    /// A currency with rate zero cannot become the base.
    #[error("Currency {0} has an exchange rate of zero and cannot be the base currency")]
    ZeroBaseRate(String),

    /// Re-basing produced a rate that overflows or collapses to zero.
    #[error("Re-basing on {0} leaves an exchange rate outside the representable range")]
    RateOutOfRange(String),

    /// Exchange rates must be strictly positive.
    #[error("Exchange rate must be positive")]
    NonPositiveRate,
}

impl From<CurrencyError> for AppError {
    fn from(err: CurrencyError) -> Self {
        let message = err.to_string();
        match err {
            CurrencyError::NotFound(_) | CurrencyError::UnknownCode(_) => Self::NotFound(message),
            CurrencyError::DefaultDeletion(_)
            | CurrencyError::DefaultUnset(_)
            | CurrencyError::DefaultTaken(_)
            | CurrencyError::DuplicateCode(_) => Self::Conflict(message),
            CurrencyError::ZeroBaseRate(_) | CurrencyError::RateOutOfRange(_) => {
                Self::InvalidState(message)
            }
            CurrencyError::NonPositiveRate => Self::Validation(message),
        }
    }
}
