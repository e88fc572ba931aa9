//! Entity re-exports.

pub use super::currencies::Entity as Currencies;
