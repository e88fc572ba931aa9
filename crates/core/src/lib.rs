//! Core business logic for Tillpoint.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All currency rules, re-basing and conversion live here; the database crate
//! only loads and persists what the currency book decides.
//!
//! # Modules
//!
//! - `currency` - Currency book, default-currency re-basing and conversion

pub mod currency;
