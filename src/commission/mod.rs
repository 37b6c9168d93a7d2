pub mod calculator;
pub mod outcome;
pub mod payments;
pub mod service;

pub use outcome::{CommissionOutcome, CommissionResult, ReconciliationStatus};
pub use service::CommissionService;
