//! The currency book: every currency of the POS and the rules tying them
//! together.
//!
//! All invariants live here, independent of storage:
//! - at most one currency is the default, and once any currency exists one is
//! - the default currency's rate is exactly 1
//! - all other rates are relative to the default
//!
//! Each mutating operation works on a copy and only replaces the book's rows
//! on success, returning the ordered [`ChangeSet`] a repository must apply in
//! a single transaction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tillpoint_shared::CurrencyId;

use super::conversion::{AMOUNT_SCALE, convert_amount, cross_rate};
use super::error::CurrencyError;
use super::rebase::{normalize_rate, rebase_onto};
use super::types::{ChangeSet, Conversion, Currency, CurrencyUpdate, CurrencyWrite, NewCurrency};

/// Normalizes a currency code for storage and lookup.
#[must_use]
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// In-memory view of the full currency set.
#[derive(Debug, Clone, Default)]
pub struct CurrencyBook {
    currencies: Vec<Currency>,
}

impl CurrencyBook {
    /// Creates a book over an existing set of currencies.
    #[must_use]
    pub const fn new(currencies: Vec<Currency>) -> Self {
        Self { currencies }
    }

    /// All currencies, in load order.
    #[must_use]
    pub fn currencies(&self) -> &[Currency] {
        &self.currencies
    }

    /// Consumes the book, returning its currencies.
    #[must_use]
    pub fn into_currencies(self) -> Vec<Currency> {
        self.currencies
    }

    /// Looks up a currency by id.
    #[must_use]
    pub fn get(&self, id: CurrencyId) -> Option<&Currency> {
        self.currencies.iter().find(|c| c.id == id)
    }

    /// Looks up a currency by code (case-insensitive).
    #[must_use]
    pub fn find_by_code(&self, code: &str) -> Option<&Currency> {
        let code = normalize_code(code);
        self.currencies.iter().find(|c| c.code == code)
    }

    /// The current default currency, if any.
    #[must_use]
    pub fn default_currency(&self) -> Option<&Currency> {
        self.currencies.iter().find(|c| c.is_default)
    }

    /// Adds a currency.
    ///
    /// A currency created as default (or the first currency of an empty book)
    /// takes rate 1 and the previous default loses its flag. Otherwise the
    /// supplied rate, relative to the current default, must be positive.
    ///
    /// # Errors
    ///
    /// - [`CurrencyError::DuplicateCode`] if the code is taken
    /// - [`CurrencyError::NonPositiveRate`] for a non-default rate `<= 0`
    pub fn create(
        &mut self,
        input: NewCurrency,
        now: DateTime<Utc>,
    ) -> Result<ChangeSet, CurrencyError> {
        let code = normalize_code(&input.code);
        self.ensure_code_free(&code, None)?;

        let promote = input.is_default || self.currencies.is_empty();
        let exchange_rate = if promote {
            Decimal::ONE
        } else {
            positive_rate(input.exchange_rate)?
        };

        let mut working = self.currencies.clone();
        let mut writes = Vec::with_capacity(2);
        if promote {
            for current in working.iter_mut().filter(|c| c.is_default) {
                current.is_default = false;
                current.updated_at = now;
                writes.push(CurrencyWrite::Update(current.clone()));
            }
        }

        let currency = Currency {
            id: CurrencyId::new(),
            name: input.name.trim().to_string(),
            code,
            symbol: input.symbol.trim().to_string(),
            exchange_rate,
            is_default: promote,
            created_at: now,
            updated_at: now,
        };
        writes.push(CurrencyWrite::Insert(currency.clone()));
        working.push(currency.clone());

        self.currencies = working;
        Ok(ChangeSet {
            writes,
            subject: currency,
        })
    }

    /// Replaces a currency's fields.
    ///
    /// - The current default keeps rate 1 and cannot drop its flag.
    /// - Promoting a non-default currency applies the new fields and rate,
    ///   then re-bases every currency onto it.
    ///
    /// # Errors
    ///
    /// - [`CurrencyError::NotFound`] if `id` is unknown
    /// - [`CurrencyError::DuplicateCode`] if the new code is taken
    /// - [`CurrencyError::DefaultUnset`] when clearing the default's flag
    /// - [`CurrencyError::NonPositiveRate`] for a non-default rate `<= 0`
    /// - re-basing errors when promoting
    pub fn update(
        &mut self,
        id: CurrencyId,
        input: CurrencyUpdate,
        now: DateTime<Utc>,
    ) -> Result<ChangeSet, CurrencyError> {
        let existing = self.get(id).ok_or(CurrencyError::NotFound(id))?;
        let was_default = existing.is_default;
        let code = normalize_code(&input.code);
        self.ensure_code_free(&code, Some(id))?;

        if was_default && input.is_default == Some(false) {
            return Err(CurrencyError::DefaultUnset(existing.code.clone()));
        }

        let exchange_rate = if was_default {
            Decimal::ONE
        } else {
            positive_rate(input.exchange_rate)?
        };

        let mut working = self.currencies.clone();
        if let Some(currency) = working.iter_mut().find(|c| c.id == id) {
            currency.name = input.name.trim().to_string();
            currency.code = code;
            currency.symbol = input.symbol.trim().to_string();
            currency.exchange_rate = exchange_rate;
            currency.updated_at = now;
        }

        if !was_default && input.is_default == Some(true) {
            return self.commit_rebase(working, id, now);
        }

        let subject = working
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(CurrencyError::NotFound(id))?;
        self.currencies = working;
        Ok(ChangeSet {
            writes: vec![CurrencyWrite::Update(subject.clone())],
            subject,
        })
    }

    /// Makes `id` the default currency, re-basing every rate onto it.
    ///
    /// Runs the full re-base even when `id` already is the default; the rates
    /// then come out unchanged since its rate is 1.
    ///
    /// # Errors
    ///
    /// - [`CurrencyError::NotFound`] if `id` is unknown
    /// - [`CurrencyError::ZeroBaseRate`] if its rate is zero
    /// - [`CurrencyError::RateOutOfRange`] if a re-based rate is not representable
    pub fn set_default(
        &mut self,
        id: CurrencyId,
        now: DateTime<Utc>,
    ) -> Result<ChangeSet, CurrencyError> {
        let working = self.currencies.clone();
        self.commit_rebase(working, id, now)
    }

    /// Removes a non-default currency.
    ///
    /// # Errors
    ///
    /// - [`CurrencyError::NotFound`] if `id` is unknown
    /// - [`CurrencyError::DefaultDeletion`] if it is the default
    pub fn delete(&mut self, id: CurrencyId) -> Result<ChangeSet, CurrencyError> {
        let index = self
            .currencies
            .iter()
            .position(|c| c.id == id)
            .ok_or(CurrencyError::NotFound(id))?;
        if self.currencies[index].is_default {
            return Err(CurrencyError::DefaultDeletion(
                self.currencies[index].code.clone(),
            ));
        }

        let removed = self.currencies.remove(index);
        Ok(ChangeSet {
            writes: vec![CurrencyWrite::Delete(id)],
            subject: removed,
        })
    }

    /// Converts `amount` of currency `from` into currency `to`.
    ///
    /// # Errors
    ///
    /// - [`CurrencyError::UnknownCode`] if either code is unknown
    /// - [`CurrencyError::ZeroBaseRate`] if `from` has rate zero
    pub fn convert(
        &self,
        amount: Decimal,
        from: &str,
        to: &str,
    ) -> Result<Conversion, CurrencyError> {
        let source = self
            .find_by_code(from)
            .ok_or_else(|| CurrencyError::UnknownCode(normalize_code(from)))?;
        let target = self
            .find_by_code(to)
            .ok_or_else(|| CurrencyError::UnknownCode(normalize_code(to)))?;

        let rate = cross_rate(source.exchange_rate, target.exchange_rate)
            .ok_or_else(|| CurrencyError::ZeroBaseRate(source.code.clone()))?;

        Ok(Conversion {
            from: source.code.clone(),
            to: target.code.clone(),
            amount,
            rate: normalize_rate(rate),
            converted: convert_amount(amount, rate, AMOUNT_SCALE),
        })
    }

    /// Re-bases `working` onto `target` and, on success, replaces the book's
    /// rows. Writes clear the previous default first and set the new one last.
    fn commit_rebase(
        &mut self,
        mut working: Vec<Currency>,
        target: CurrencyId,
        now: DateTime<Utc>,
    ) -> Result<ChangeSet, CurrencyError> {
        let previous_default: Vec<CurrencyId> = working
            .iter()
            .filter(|c| c.is_default && c.id != target)
            .map(|c| c.id)
            .collect();

        rebase_onto(&mut working, target)?;
        for currency in &mut working {
            currency.updated_at = now;
        }

        let mut writes = Vec::with_capacity(working.len());
        writes.extend(
            working
                .iter()
                .filter(|c| previous_default.contains(&c.id))
                .cloned()
                .map(CurrencyWrite::Update),
        );
        writes.extend(
            working
                .iter()
                .filter(|c| c.id != target && !previous_default.contains(&c.id))
                .cloned()
                .map(CurrencyWrite::Update),
        );

        let subject = working
            .iter()
            .find(|c| c.id == target)
            .cloned()
            .ok_or(CurrencyError::NotFound(target))?;
        writes.push(CurrencyWrite::Update(subject.clone()));

        self.currencies = working;
        Ok(ChangeSet { writes, subject })
    }

    fn ensure_code_free(
        &self,
        code: &str,
        except: Option<CurrencyId>,
    ) -> Result<(), CurrencyError> {
        let taken = self
            .currencies
            .iter()
            .any(|c| c.code == code && Some(c.id) != except);
        if taken {
            return Err(CurrencyError::DuplicateCode(code.to_string()));
        }
        Ok(())
    }
}

fn positive_rate(rate: Decimal) -> Result<Decimal, CurrencyError> {
    let rate = normalize_rate(rate);
    if rate <= Decimal::ZERO {
        return Err(CurrencyError::NonPositiveRate);
    }
    Ok(rate)
}
