//! Currency repository: loads the currency book, applies its decisions
//! transactionally.
//!
//! Every mutating operation runs as one database transaction:
//! 1. lock the currencies table against other writers, then load every row
//! 2. let [`CurrencyBook`] validate and compute the writes
//! 3. apply the writes in order and commit
//!
//! The table lock (not row locks) also serialises writers on an empty table,
//! where there are no rows to lock. Plain reads are not blocked.
//!
//! Any error rolls the whole transaction back, so a re-base is applied to
//! every row or to none.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, SqlErr, TransactionTrait,
};
use tracing::{error, info, warn};

use crate::entities::currencies;
use tillpoint_core::currency::{
    ChangeSet, Conversion, Currency, CurrencyBook, CurrencyError, CurrencyUpdate, CurrencyWrite,
    NewCurrency,
};
use tillpoint_shared::{AppError, CurrencyId};

/// Self-conflicting lock mode: one writer at a time, readers unaffected.
const LOCK_CURRENCIES: &str = "LOCK TABLE currencies IN SHARE ROW EXCLUSIVE MODE";

/// Unique index on `UPPER(code)`.
const CODE_INDEX: &str = "uq_currencies_code";

/// Partial unique index allowing a single default row.
const SINGLE_DEFAULT_INDEX: &str = "uq_currencies_single_default";

/// Error types for currency repository operations.
#[derive(Debug, thiserror::Error)]
pub enum CurrencyRepositoryError {
    /// A currency rule rejected the operation.
    #[error(transparent)]
    Currency(#[from] CurrencyError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<CurrencyRepositoryError> for AppError {
    fn from(err: CurrencyRepositoryError) -> Self {
        match err {
            CurrencyRepositoryError::Currency(e) => e.into(),
            CurrencyRepositoryError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Currency repository.
#[derive(Debug, Clone)]
pub struct CurrencyRepository {
    db: DatabaseConnection,
}

impl CurrencyRepository {
    /// Creates a new currency repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists all currencies, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<Currency>, CurrencyRepositoryError> {
        let rows = currencies::Entity::find()
            .order_by_desc(currencies::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(Currency::from).collect())
    }

    /// Finds a currency by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no such currency exists.
    pub async fn find(&self, id: CurrencyId) -> Result<Currency, CurrencyRepositoryError> {
        currencies::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .map(Currency::from)
            .ok_or_else(|| CurrencyError::NotFound(id).into())
    }

    /// Creates a currency. Creating it as default clears the previous default
    /// in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is taken, the rate is not positive, or
    /// the database operation fails.
    pub async fn create(&self, input: NewCurrency) -> Result<Currency, CurrencyRepositoryError> {
        let currency = self.mutate(|book, now| book.create(input, now)).await?;

        info!(
            currency_id = %currency.id,
            code = %currency.code,
            rate = %currency.exchange_rate,
            is_default = currency.is_default,
            "Currency created"
        );
        Ok(currency)
    }

    /// Updates a currency. Promoting it to default re-bases every rate in the
    /// same transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the currency does not exist, a currency rule
    /// rejects the update, or the database operation fails.
    pub async fn update(
        &self,
        id: CurrencyId,
        input: CurrencyUpdate,
    ) -> Result<Currency, CurrencyRepositoryError> {
        let currency = self.mutate(|book, now| book.update(id, input, now)).await?;

        info!(
            currency_id = %currency.id,
            code = %currency.code,
            rate = %currency.exchange_rate,
            is_default = currency.is_default,
            "Currency updated"
        );
        Ok(currency)
    }

    /// Makes a currency the default and re-bases every exchange rate onto it.
    ///
    /// Always rewrites every row, even when the currency already is the
    /// default.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id, `ZeroBaseRate` if the currency's
    /// rate is zero, or a database error. Nothing is written on error.
    pub async fn set_default(&self, id: CurrencyId) -> Result<Currency, CurrencyRepositoryError> {
        let currency = self.mutate(|book, now| book.set_default(id, now)).await?;

        info!(
            currency_id = %currency.id,
            code = %currency.code,
            "Default currency changed; exchange rates re-based"
        );
        Ok(currency)
    }

    /// Deletes a non-default currency, returning the removed record.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id, `DefaultDeletion` for the
    /// default currency, or a database error.
    pub async fn delete(&self, id: CurrencyId) -> Result<Currency, CurrencyRepositoryError> {
        let currency = self.mutate(|book, _| book.delete(id)).await?;

        info!(currency_id = %currency.id, code = %currency.code, "Currency deleted");
        Ok(currency)
    }

    /// Converts an amount between two currencies by code.
    ///
    /// # Errors
    ///
    /// Returns `UnknownCode` for unknown codes, `ZeroBaseRate` when the
    /// source rate is zero, or a database error.
    pub async fn convert(
        &self,
        amount: Decimal,
        from: &str,
        to: &str,
    ) -> Result<Conversion, CurrencyRepositoryError> {
        let book = load_book(&self.db).await?;
        Ok(book.convert(amount, from, to)?)
    }

    /// Runs a book operation inside a transaction and persists its writes.
    async fn mutate<F>(&self, operation: F) -> Result<Currency, CurrencyRepositoryError>
    where
        F: FnOnce(&mut CurrencyBook, chrono::DateTime<Utc>) -> Result<ChangeSet, CurrencyError>,
    {
        let txn = self.db.begin().await?;
        txn.execute_unprepared(LOCK_CURRENCIES).await?;
        let mut book = load_book(&txn).await?;

        let changes = match operation(&mut book, Utc::now()) {
            Ok(changes) => changes,
            Err(e) => {
                warn!(error = %e, "Currency operation rejected");
                rollback(txn).await;
                return Err(e.into());
            }
        };

        if let Err(e) = apply_writes(&txn, &changes.writes).await {
            let err = map_write_error(e, &changes.subject);
            warn!(error = %err, code = %changes.subject.code, "Currency write failed");
            rollback(txn).await;
            return Err(err);
        }

        txn.commit().await?;
        Ok(changes.subject)
    }
}

/// Rolls back, keeping the caller's error if the rollback itself fails.
async fn rollback(txn: DatabaseTransaction) {
    if let Err(e) = txn.rollback().await {
        error!(error = %e, "Failed to roll back currency transaction");
    }
}

/// Loads every currency into a book.
async fn load_book<C>(conn: &C) -> Result<CurrencyBook, DbErr>
where
    C: ConnectionTrait,
{
    let rows = currencies::Entity::find()
        .order_by_asc(currencies::Column::CreatedAt)
        .all(conn)
        .await?;

    Ok(CurrencyBook::new(rows.into_iter().map(Currency::from).collect()))
}

/// Applies writes in order; the book already placed demotions first.
async fn apply_writes<C>(conn: &C, writes: &[CurrencyWrite]) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    for write in writes {
        match write {
            CurrencyWrite::Insert(currency) => {
                currencies::Entity::insert(currencies::ActiveModel::from(currency))
                    .exec_without_returning(conn)
                    .await?;
            }
            CurrencyWrite::Update(currency) => {
                let result = currencies::Entity::update_many()
                    .set(currencies::ActiveModel::from(currency))
                    .filter(currencies::Column::Id.eq(currency.id.into_inner()))
                    .exec(conn)
                    .await?;
                if result.rows_affected == 0 {
                    return Err(DbErr::RecordNotUpdated);
                }
            }
            CurrencyWrite::Delete(id) => {
                currencies::Entity::delete_by_id(id.into_inner())
                    .exec(conn)
                    .await?;
            }
        }
    }
    Ok(())
}

/// Unique violations at write time mean another writer got in between; the
/// index name tells which rule was hit.
fn map_write_error(err: DbErr, subject: &Currency) -> CurrencyRepositoryError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(message)) if message.contains(CODE_INDEX) => {
            CurrencyError::DuplicateCode(subject.code.clone()).into()
        }
        Some(SqlErr::UniqueConstraintViolation(message))
            if message.contains(SINGLE_DEFAULT_INDEX) =>
        {
            CurrencyError::DefaultTaken(subject.code.clone()).into()
        }
        _ => err.into(),
    }
}
