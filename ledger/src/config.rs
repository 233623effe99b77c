//! Configuration for the stock batch ledger
//!
//! Supports default values in code with environment variable overrides
//! using the LEDGER_ prefix.

use config::{ConfigError, Environment};
use serde::Deserialize;

/// Engine tunables
#[derive(Debug, Deserialize, Clone)]
pub struct LedgerConfig {
    /// Attempts per mutating operation before a transaction conflict is
    /// surfaced as `ConcurrentModification`
    pub max_txn_retries: u32,
}

impl LedgerConfig {
    /// Load configuration from defaults and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            .set_default("max_txn_retries", 3)?
            .add_source(
                Environment::with_prefix("LEDGER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self { max_txn_retries: 3 }
    }
}
