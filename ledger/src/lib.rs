//! Stock Batch Ledger
//!
//! Tracks physical inventory as discrete cost-bearing batches, consumes
//! them under pluggable costing policies (FIFO, LIFO, weighted-average),
//! and produces an immutable audit trail of every quantity change.
//!
//! Stock totals are always derived from the batch set on demand; no cached
//! mutable total is a source of truth. The engine is generic over a
//! transactional [`store::BatchStore`] and holds no shared mutable state of
//! its own, so it can be called freely from concurrent request handlers.

pub mod config;
pub mod error;
pub mod services;
pub mod store;

pub use config::LedgerConfig;
pub use error::{LedgerError, LedgerResult};
