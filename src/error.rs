use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::migrate::MigrateError;
use thiserror::Error;

use crate::commission::outcome::ReconciliationStatus;

/// Top-level error type for the entire application
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Reconciliation error: {0}")]
    Reconciliation(#[from] CommissionError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Payment gateway errors
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gateway API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode gateway response: {0}")]
    Decode(String),
}

/// Commission store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Every way a reconciliation pass can end without recording anything.
///
/// Variants are grouped the way callers care about them: missing input,
/// missing records, payment shapes we cannot price, and transport failures.
#[derive(Error, Debug)]
pub enum CommissionError {
    #[error("Webhook carries no payment object")]
    NoPaymentObject,

    #[error("Payment object has no payment intent")]
    NoPaymentIntent,

    #[error("Payment object has no customer")]
    NoCustomer,

    /// Reports plain `error`, unlike `NoPaymentIntent`
    #[error("Payment object has no payment intent to recompute")]
    MissingPaymentIntent,

    #[error("Webhook carries no connected account")]
    NoAccount,

    #[error("No gateway customer found for {email}")]
    CustomerNotFound { email: String },

    #[error("Gateway customer {customer_id} does not match {email}")]
    CustomerEmailMismatch { customer_id: String, email: String },

    #[error("Customer {customer_id} carries no referral metadata")]
    NoReferralMetadata { customer_id: String },

    #[error("Payment intent {payment_intent_id} carries no commission id")]
    NoCommissionId { payment_intent_id: String },

    #[error("Commission not found: {0}")]
    CommissionNotFound(String),

    #[error("Referral not found: {0}")]
    ReferralNotFound(String),

    #[error("Referral {referral_id} has no commission to anchor the billing cycle")]
    NoAnchorCommission { referral_id: String },

    #[error("Commission period exceeded for {referral_id}: {months} months of {period}")]
    CommissionPeriodExceeded {
        referral_id: String,
        months: i64,
        period: i32,
    },

    #[error("Payment has no invoice to attribute")]
    NoInvoice,

    #[error("Invalid payment timestamp: {0}")]
    InvalidPaymentTimestamp(i64),

    #[error("Commission on {net_amount} at {value} does not fit in minor units")]
    CommissionOverflow { net_amount: i64, value: Decimal },

    #[error("Cannot price payment {payment_intent_id:?}: neither invoice nor charge")]
    PaymentShapeUnknown { payment_intent_id: Option<String> },

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CommissionError {
    /// Status string reported to webhook senders and dashboard callers
    pub fn status(&self) -> ReconciliationStatus {
        match self {
            CommissionError::NoPaymentIntent => ReconciliationStatus::NoPaymentIntent,
            CommissionError::NoCustomer => ReconciliationStatus::NoCustomer,
            CommissionError::PaymentShapeUnknown { .. } => ReconciliationStatus::CalculationError,
            _ => ReconciliationStatus::Error,
        }
    }

    /// Gateway or store failure, as opposed to a business-level miss
    pub fn is_transport(&self) -> bool {
        matches!(self, CommissionError::Gateway(_) | CommissionError::Store(_))
    }
}

impl From<sqlx::Error> for CommissionError {
    fn from(error: sqlx::Error) -> Self {
        CommissionError::Store(StoreError::Database(error))
    }
}

/// API error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            AppError::Reconciliation(CommissionError::Gateway(e)) | AppError::Gateway(e) => (
                StatusCode::BAD_GATEWAY,
                "GATEWAY_ERROR",
                format!("Payment gateway request failed: {}", e),
                None,
            ),
            AppError::Reconciliation(CommissionError::Store(_)) | AppError::Store(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                "A database error occurred".to_string(),
                None,
            ),
            AppError::Reconciliation(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "RECONCILIATION_FAILED",
                e.to_string(),
                Some(serde_json::json!({ "status": e.status() })),
            ),
            AppError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("Not found: {}", what),
                None,
            ),
            AppError::InvalidInput(msg) => (
                StatusCode::BAD_REQUEST,
                "INVALID_INPUT",
                msg,
                None,
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
                None,
            ),
        };

        let body = Json(ErrorResponse {
            error: message,
            error_code: error_code.to_string(),
            details,
        });

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        AppError::Store(StoreError::Database(error))
    }
}

impl From<MigrateError> for AppError {
    fn from(error: MigrateError) -> Self {
        AppError::Internal(format!("Migration error: {:?}", error))
    }
}

/// Result type alias for the application
pub type AppResult<T> = Result<T, AppError>;
