//! Property-based tests for the currency book.
//!
//! - Single default across arbitrary operation sequences
//! - Default rate is exactly 1
//! - Re-basing is idempotent
//! - Re-basing preserves the ratio between any two currencies
//! - Re-basing away and back restores every rate
//! - The default cannot be deleted
//! - A zero-rate currency cannot become the base

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use tillpoint_shared::CurrencyId;

use super::book::CurrencyBook;
use super::error::CurrencyError;
use super::types::{Currency, CurrencyUpdate, NewCurrency};

/// Strategy to generate positive exchange rates from 1e-8 to ~1e8: a 4-digit
/// mantissa shifted by 16 orders of magnitude.
fn positive_rate() -> impl Strategy<Value = Decimal> {
    (1i64..10_000i64, 8u32..=20u32)
        .prop_map(|(mantissa, scale)| Decimal::new(mantissa * 1_000_000_000_000, scale))
}

/// Relative drift allowed after re-basing. The smallest ratios (1e-16) keep
/// about 12 significant digits at the maximum decimal scale.
fn tolerance() -> Decimal {
    Decimal::new(1, 9)
}

fn within_tolerance(actual: Decimal, expected: Decimal) -> bool {
    (actual - expected).abs() <= expected.abs() * tolerance()
}

/// Strategy to generate a book with a USD default and 1-8 other currencies.
fn seeded_book() -> impl Strategy<Value = CurrencyBook> {
    prop::collection::vec(positive_rate(), 1..9).prop_map(|rates| {
        let now = Utc::now();
        let mut currencies = vec![currency("USD", Decimal::ONE, true)];
        currencies.extend(
            rates
                .into_iter()
                .enumerate()
                .map(|(i, rate)| currency(&format!("C{i:02}"), rate, false)),
        );
        for c in &mut currencies {
            c.created_at = now;
            c.updated_at = now;
        }
        CurrencyBook::new(currencies)
    })
}

fn currency(code: &str, exchange_rate: Decimal, is_default: bool) -> Currency {
    let now = Utc::now();
    Currency {
        id: CurrencyId::new(),
        name: code.to_string(),
        code: code.to_string(),
        symbol: code.to_string(),
        exchange_rate,
        is_default,
        created_at: now,
        updated_at: now,
    }
}

/// An operation against the book. Indices are taken modulo the book size.
#[derive(Debug, Clone)]
enum Op {
    Create { rate: Decimal, is_default: bool },
    SetDefault(usize),
    Update { index: usize, rate: Decimal, is_default: Option<bool> },
    Delete(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (positive_rate(), any::<bool>())
            .prop_map(|(rate, is_default)| Op::Create { rate, is_default }),
        any::<usize>().prop_map(Op::SetDefault),
        (any::<usize>(), positive_rate(), prop::option::of(any::<bool>()))
            .prop_map(|(index, rate, is_default)| Op::Update { index, rate, is_default }),
        any::<usize>().prop_map(Op::Delete),
    ]
}

fn id_at(book: &CurrencyBook, index: usize) -> Option<CurrencyId> {
    let currencies = book.currencies();
    if currencies.is_empty() {
        return None;
    }
    Some(currencies[index % currencies.len()].id)
}

fn apply(book: &mut CurrencyBook, op: Op, serial: usize) {
    let now = Utc::now();
    // Business-rule rejections are expected; only the invariants matter here.
    let _ = match op {
        Op::Create { rate, is_default } => book
            .create(
                NewCurrency {
                    name: format!("Currency {serial}"),
                    code: format!("K{serial:03}"),
                    symbol: "¤".into(),
                    exchange_rate: rate,
                    is_default,
                },
                now,
            )
            .map(|_| ()),
        Op::SetDefault(index) => match id_at(book, index) {
            Some(id) => book.set_default(id, now).map(|_| ()),
            None => Ok(()),
        },
        Op::Update { index, rate, is_default } => match id_at(book, index) {
            Some(id) => {
                let existing = book.get(id).cloned();
                match existing {
                    Some(existing) => book
                        .update(
                            id,
                            CurrencyUpdate {
                                name: existing.name,
                                code: existing.code,
                                symbol: existing.symbol,
                                exchange_rate: rate,
                                is_default,
                            },
                            now,
                        )
                        .map(|_| ()),
                    None => Ok(()),
                }
            }
            None => Ok(()),
        },
        Op::Delete(index) => match id_at(book, index) {
            Some(id) => book.delete(id).map(|_| ()),
            None => Ok(()),
        },
    };
}

fn rates(book: &CurrencyBook) -> Vec<Decimal> {
    book.currencies().iter().map(|c| c.exchange_rate).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* sequence of operations, exactly one currency is the default
    /// once the book is non-empty, and it carries rate 1.
    #[test]
    fn prop_single_default_with_unit_rate(ops in prop::collection::vec(op(), 1..40)) {
        let mut book = CurrencyBook::default();
        for (serial, op) in ops.into_iter().enumerate() {
            apply(&mut book, op, serial);

            let defaults: Vec<_> = book.currencies().iter().filter(|c| c.is_default).collect();
            if book.currencies().is_empty() {
                prop_assert!(defaults.is_empty());
            } else {
                prop_assert_eq!(defaults.len(), 1, "exactly one default expected");
                prop_assert_eq!(defaults[0].exchange_rate, Decimal::ONE);
            }
        }
    }

    /// *For any* book and target, re-basing twice yields the same rates as
    /// re-basing once.
    #[test]
    fn prop_rebase_is_idempotent(book in seeded_book(), pick in any::<usize>()) {
        let mut book = book;
        let target = id_at(&book, pick).unwrap();

        book.set_default(target, Utc::now()).unwrap();
        let once = rates(&book);
        book.set_default(target, Utc::now()).unwrap();
        let twice = rates(&book);

        prop_assert_eq!(once, twice);
    }

    /// *For any* two currencies, their rate ratio survives a re-base up to
    /// the rounding of the stored scale.
    #[test]
    fn prop_rebase_preserves_ratios(book in seeded_book(), pick in any::<usize>()) {
        let mut book = book;
        let target = id_at(&book, pick).unwrap();
        let before = rates(&book);

        book.set_default(target, Utc::now()).unwrap();
        let after = rates(&book);

        for a in 0..before.len() {
            for b in 0..before.len() {
                let expected = before[a] / before[b];
                let actual = after[a] / after[b];
                prop_assert!(
                    within_tolerance(actual, expected),
                    "ratio {}/{} drifted from {} to {}",
                    a, b, expected, actual
                );
            }
        }
    }

    /// *For any* book and target, re-basing onto the target and back onto
    /// the original default restores every rate.
    #[test]
    fn prop_rebase_round_trip_restores_rates(book in seeded_book(), pick in any::<usize>()) {
        let mut book = book;
        let original = book.default_currency().unwrap().id;
        let target = id_at(&book, pick).unwrap();
        let before = rates(&book);

        book.set_default(target, Utc::now()).unwrap();
        book.set_default(original, Utc::now()).unwrap();
        let after = rates(&book);

        for (restored, expected) in after.iter().zip(&before) {
            prop_assert!(
                within_tolerance(*restored, *expected),
                "rate drifted from {} to {}",
                expected, restored
            );
        }
    }

    /// *For any* book, deleting the default fails and leaves it unchanged.
    #[test]
    fn prop_default_cannot_be_deleted(book in seeded_book()) {
        let mut book = book;
        let default_id = book.default_currency().unwrap().id;
        let before = book.currencies().to_vec();

        let result = book.delete(default_id);

        prop_assert!(matches!(result, Err(CurrencyError::DefaultDeletion(_))));
        prop_assert_eq!(book.currencies(), before.as_slice());
    }

    /// *For any* book containing a zero-rate currency, making it the default
    /// fails and leaves every rate unchanged.
    #[test]
    fn prop_zero_rate_cannot_be_base(book in seeded_book()) {
        let mut currencies = book.into_currencies();
        let zero = currency("ZZZ", Decimal::ZERO, false);
        let zero_id = zero.id;
        currencies.push(zero);
        let mut book = CurrencyBook::new(currencies);
        let before = book.currencies().to_vec();

        let result = book.set_default(zero_id, Utc::now());

        prop_assert_eq!(result.unwrap_err(), CurrencyError::ZeroBaseRate("ZZZ".into()));
        prop_assert_eq!(book.currencies(), before.as_slice());
    }
}
