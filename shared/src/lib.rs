//! Shared types and models for the stock batch ledger
//!
//! This crate contains the pure domain types shared between the ledger
//! engine and any component that reads its records. No I/O lives here.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
