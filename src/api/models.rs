use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::commission::ReconciliationStatus;

// ========== REQUEST MODELS ==========

/// Dashboard request to attribute a referred customer's latest payment
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommissionRequest {
    #[validate(length(min = 1, message = "referral_id is required"))]
    pub referral_id: String,

    /// Connected gateway account of the company
    #[validate(length(min = 1, message = "stripe_id is required"))]
    pub stripe_id: String,

    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
}

// ========== RESPONSE MODELS ==========

/// Outcome of a dashboard-triggered reconciliation
#[derive(Debug, Serialize)]
pub struct CommissionStatusResponse {
    pub status: ReconciliationStatus,
}

impl From<ReconciliationStatus> for CommissionStatusResponse {
    fn from(status: ReconciliationStatus) -> Self {
        Self { status }
    }
}

/// Webhook processing response
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub accepted: bool,
    pub event_type: Option<String>,
    /// Reconciliation status, or `ignored` for unhandled events
    pub status: String,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_validation() {
        let valid = CreateCommissionRequest {
            referral_id: "ref_1".to_string(),
            stripe_id: "acct_1".to_string(),
            email: "buyer@example.com".to_string(),
        };
        assert!(valid.validate().is_ok());

        let bad_email = CreateCommissionRequest {
            email: "not-an-email".to_string(),
            ..valid
        };
        let errors = bad_email.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_status_response_uses_legacy_strings() {
        let body = serde_json::to_value(CommissionStatusResponse::from(
            ReconciliationStatus::CalculationError,
        ))
        .unwrap();
        assert_eq!(body["status"], "commission_payment_calculation_error");
    }
}
