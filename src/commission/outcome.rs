use serde::Serialize;

use crate::error::CommissionError;

/// Successful end states of a reconciliation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommissionOutcome {
    /// A commission row was written (created or recomputed)
    Success,
    /// The payment is already attributed; nothing was written
    CommissionExists,
}

impl CommissionOutcome {
    pub fn status(&self) -> ReconciliationStatus {
        match self {
            CommissionOutcome::Success => ReconciliationStatus::Success,
            CommissionOutcome::CommissionExists => ReconciliationStatus::CommissionExists,
        }
    }
}

pub type CommissionResult = Result<CommissionOutcome, CommissionError>;

/// Wire-level status strings understood by webhook route callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReconciliationStatus {
    #[serde(rename = "success")]
    Success,
    #[serde(rename = "error")]
    Error,
    #[serde(rename = "commission_exists")]
    CommissionExists,
    #[serde(rename = "commission_payment_calculation_error")]
    CalculationError,
    #[serde(rename = "no payment intent")]
    NoPaymentIntent,
    #[serde(rename = "no customer")]
    NoCustomer,
}

impl ReconciliationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconciliationStatus::Success => "success",
            ReconciliationStatus::Error => "error",
            ReconciliationStatus::CommissionExists => "commission_exists",
            ReconciliationStatus::CalculationError => "commission_payment_calculation_error",
            ReconciliationStatus::NoPaymentIntent => "no payment intent",
            ReconciliationStatus::NoCustomer => "no customer",
        }
    }

    /// Collapse a reconciliation result into its status
    pub fn of(result: &CommissionResult) -> Self {
        match result {
            Ok(outcome) => outcome.status(),
            Err(error) => error.status(),
        }
    }
}
