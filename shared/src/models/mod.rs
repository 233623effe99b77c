//! Domain models for the stock batch ledger

mod batch;
mod change;

pub use batch::*;
pub use change::*;
