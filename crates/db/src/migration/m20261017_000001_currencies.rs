//! Currencies migration.
//!
//! Creates the currencies table with the default-currency guards enforced by
//! PostgreSQL itself: at most one default row, the default row at rate 1, and
//! every rate strictly positive.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(CURRENCIES_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP TABLE IF EXISTS currencies CASCADE;")
            .await?;
        Ok(())
    }
}

const CURRENCIES_SQL: &str = r"
CREATE TABLE currencies (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(100) NOT NULL,
    code VARCHAR(10) NOT NULL,
    symbol VARCHAR(10) NOT NULL,
    exchange_rate NUMERIC NOT NULL,
    is_default BOOLEAN NOT NULL DEFAULT false,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_rate_positive CHECK (exchange_rate > 0),
    CONSTRAINT chk_default_rate_is_one CHECK (NOT is_default OR exchange_rate = 1)
);

-- Codes are unique regardless of case
CREATE UNIQUE INDEX uq_currencies_code ON currencies(UPPER(code));

-- At most one default currency
CREATE UNIQUE INDEX uq_currencies_single_default ON currencies(is_default) WHERE is_default;

-- Listing is newest first
CREATE INDEX idx_currencies_created ON currencies(created_at DESC);
";
