//! `SeaORM` entity definitions.

pub mod currencies;
pub mod prelude;
