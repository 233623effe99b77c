//! Business logic services for the stock batch ledger

pub mod adjustment;
pub mod consumption;
pub mod costing;
pub mod deletion;
pub mod reporting;

pub use adjustment::AdjustmentService;
pub use consumption::ConsumptionService;
pub use deletion::DeletionService;
pub use reporting::ReportingService;
