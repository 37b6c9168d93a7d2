//! Gateway objects, trimmed to the fields reconciliation reads.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Customer metadata key carrying the referral id
pub const REFERRAL_ID_KEY: &str = "reflio_referral_id";
/// Payment intent metadata key carrying the commission id
pub const COMMISSION_ID_KEY: &str = "reflio_commission_id";

pub type Metadata = HashMap<String, String>;

/// Paginated list envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct List<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Customer {
    pub fn referral_id(&self) -> Option<&str> {
        self.metadata
            .get(REFERRAL_ID_KEY)
            .map(String::as_str)
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Charge {
    pub id: String,
    #[serde(default)]
    pub amount: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub amount_received: i64,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub invoice: Option<String>,
    /// Present on API versions before 2022-11-15
    #[serde(default)]
    pub charges: Option<List<Charge>>,
    #[serde(default)]
    pub latest_charge: Option<String>,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub created: i64,
}

impl PaymentIntent {
    pub fn commission_id(&self) -> Option<&str> {
        self.metadata
            .get(COMMISSION_ID_KEY)
            .map(String::as_str)
            .filter(|id| !id.is_empty())
    }

    pub fn has_charges(&self) -> bool {
        self.charges.is_some() || self.latest_charge.is_some()
    }

    /// Amount actually collected, falling back to the requested amount
    pub fn sale_amount(&self) -> i64 {
        if self.amount_received > 0 {
            self.amount_received
        } else {
            self.amount
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Refund {
    pub id: String,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub payment_intent: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    #[serde(default)]
    pub amount_paid: i64,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub payment_intent: Option<String>,
    #[serde(default)]
    pub created: i64,
}

/// Gateway error body: `{ "error": { "message": ... } }`
#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: ApiErrorDetail,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "type")]
    pub error_type: Option<String>,
}

/// Webhook envelope: `{ data: { object }, account }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "type")]
    pub event_type: Option<String>,
    /// Connected account the event happened on
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default)]
    pub data: Option<WebhookEventData>,
    #[serde(default)]
    pub created: Option<i64>,
}

/// `object` stays raw until routing picks a payment action; other event
/// types carry objects of unrelated shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookEventData {
    #[serde(default)]
    pub object: Option<serde_json::Value>,
}

/// The charge-shaped object embedded in payment webhooks
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentObject {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub payment_intent: Option<String>,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub amount: i64,
    /// Unix seconds
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub invoice: Option<String>,
}

impl WebhookEvent {
    /// Decode the embedded object as a payment; `None` when absent or not charge-shaped
    pub fn payment_object(&self) -> Option<PaymentObject> {
        let object = self.data.as_ref()?.object.as_ref()?;
        serde_json::from_value(object.clone()).ok()
    }

    /// Connected account id, empty for platform events
    pub fn account_id(&self) -> &str {
        self.account.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_intent_from_gateway_json() {
        let json = serde_json::json!({
            "id": "pi_123",
            "object": "payment_intent",
            "amount": 5000,
            "amount_received": 5000,
            "customer": "cus_1",
            "invoice": null,
            "charges": { "object": "list", "data": [{ "id": "ch_1", "amount": 5000 }], "has_more": false },
            "metadata": { "reflio_commission_id": "com_1" },
            "created": 1650000000
        });

        let intent: PaymentIntent = serde_json::from_value(json).unwrap();
        assert_eq!(intent.commission_id(), Some("com_1"));
        assert!(intent.has_charges());
        assert!(intent.invoice.is_none());
        assert_eq!(intent.sale_amount(), 5000);
    }

    #[test]
    fn test_payment_intent_without_charges() {
        let json = serde_json::json!({ "id": "pi_2", "amount": 1200, "metadata": {} });
        let intent: PaymentIntent = serde_json::from_value(json).unwrap();

        assert!(!intent.has_charges());
        assert!(intent.commission_id().is_none());
        assert_eq!(intent.sale_amount(), 1200);
    }

    #[test]
    fn test_webhook_envelope() {
        let json = serde_json::json!({
            "id": "evt_1",
            "type": "charge.refunded",
            "account": "acct_1",
            "data": { "object": {
                "id": "ch_1",
                "object": "charge",
                "payment_intent": "pi_1",
                "customer": "cus_1",
                "amount": 10000,
                "created": 1650000000,
                "refunds": { "data": [] }
            }}
        });

        let event: WebhookEvent = serde_json::from_value(json).unwrap();
        let payment = event.payment_object().unwrap();
        assert_eq!(event.account_id(), "acct_1");
        assert_eq!(payment.payment_intent.as_deref(), Some("pi_1"));
        assert_eq!(payment.amount, 10000);
        assert!(payment.invoice.is_none());
    }

    #[test]
    fn test_unrelated_object_still_parses_envelope() {
        let json = serde_json::json!({
            "id": "evt_2",
            "type": "plan.created",
            "data": { "object": { "id": "plan_1", "object": "plan", "amount": null, "tiers": [] } }
        });

        let event: WebhookEvent = serde_json::from_value(json).unwrap();
        assert_eq!(event.event_type.as_deref(), Some("plan.created"));
        assert!(event.payment_object().is_none());
    }

    #[test]
    fn test_empty_referral_metadata_is_absent() {
        let mut metadata = Metadata::new();
        metadata.insert(REFERRAL_ID_KEY.to_string(), String::new());
        let customer = Customer {
            id: "cus_1".into(),
            email: None,
            metadata,
        };
        assert!(customer.referral_id().is_none());
    }
}
