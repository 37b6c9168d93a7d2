use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, Type};
use uuid::Uuid;

/// How a referral's commission is priced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(type_name = "commission_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CommissionType {
    /// `commission_value` is paid as-is, in minor units
    Fixed,
    /// `commission_value` is a whole percentage of the net sale
    Percentage,
}

/// Referral entity - an affiliate link used by a customer, with its terms
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Referral {
    pub referral_id: String,
    pub company_id: String,
    pub affiliate_id: Option<String>,
    pub commission_value: Decimal,
    pub commission_type: CommissionType,
    /// Months after the first commission during which payments still earn
    pub commission_period: i32,
    pub created: DateTime<Utc>,
}

/// Commission entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Commission {
    pub commission_id: String,
    pub referral_id: String,
    pub company_id: String,
    pub affiliate_id: Option<String>,
    pub payment_intent_id: Option<String>,
    pub invoice_id: Option<String>,
    /// Minor currency units
    pub commission_sale_value: i64,
    /// Minor currency units
    pub commission_total: i64,
    pub paid_at: Option<DateTime<Utc>>,
    pub created: DateTime<Utc>,
}

impl Commission {
    /// Paid out commissions are never re-attributed
    pub fn is_finalized(&self) -> bool {
        self.paid_at.is_some()
    }
}

/// Company entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Company {
    pub company_id: String,
    pub stripe_id: Option<String>,
}

/// Commission row about to be inserted
#[derive(Debug, Clone)]
pub struct NewCommission {
    pub commission_id: String,
    pub referral_id: String,
    pub company_id: String,
    pub affiliate_id: Option<String>,
    pub payment_intent_id: Option<String>,
    pub invoice_id: Option<String>,
    pub sale_value: i64,
    pub total: i64,
}

impl NewCommission {
    pub fn for_referral(
        referral: &Referral,
        referral_id: &str,
        payment_intent_id: Option<String>,
        invoice_id: Option<String>,
        sale_value: i64,
        total: i64,
    ) -> Self {
        Self {
            commission_id: Uuid::new_v4().to_string(),
            referral_id: referral_id.to_string(),
            company_id: referral.company_id.clone(),
            affiliate_id: referral.affiliate_id.clone(),
            payment_intent_id,
            invoice_id,
            sale_value,
            total,
        }
    }
}

/// Result of an insert guarded by the payment intent unique constraint
#[derive(Debug, Clone)]
pub enum InsertOutcome {
    Inserted(Commission),
    Duplicate,
}
