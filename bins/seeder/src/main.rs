//! Database seeder for Tillpoint development and testing.
//!
//! Seeds a small currency catalogue with USD as the default. Currencies whose
//! code already exists are skipped, so the seeder can be re-run safely.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::info;

use tillpoint_core::currency::NewCurrency;
use tillpoint_db::{CurrencyRepository, connect_with};
use tillpoint_shared::AppConfig;

/// (name, code, symbol, rate against USD, default)
const SEED_CURRENCIES: [(&str, &str, &str, Decimal, bool); 4] = [
    ("US Dollar", "USD", "$", dec!(1), true),
    ("Euro", "EUR", "€", dec!(0.9), false),
    ("Pound Sterling", "GBP", "£", dec!(0.8), false),
    ("Nepalese Rupee", "NPR", "Rs", dec!(133.5), false),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_target(false).init();

    let config = AppConfig::load().context("failed to load configuration")?;
    let db = connect_with(&config.database)
        .await
        .context("failed to connect to database")?;
    let repo = CurrencyRepository::new(db);

    info!("Seeding currencies...");
    seed_currencies(&repo).await?;
    info!("Seeding complete!");

    Ok(())
}

/// Seeds the default currency catalogue.
async fn seed_currencies(repo: &CurrencyRepository) -> anyhow::Result<()> {
    let existing = repo.list().await?;

    for (name, code, symbol, exchange_rate, is_default) in SEED_CURRENCIES {
        if existing.iter().any(|c| c.code == code) {
            info!(code, "Currency already exists, skipping");
            continue;
        }

        // Only claim the default slot on an empty catalogue
        let is_default = is_default && existing.is_empty();
        let created = repo
            .create(NewCurrency {
                name: name.to_string(),
                code: code.to_string(),
                symbol: symbol.to_string(),
                exchange_rate,
                is_default,
            })
            .await
            .with_context(|| format!("failed to seed {code}"))?;

        info!(
            code = %created.code,
            rate = %created.exchange_rate,
            is_default = created.is_default,
            "Currency seeded"
        );
    }

    Ok(())
}
