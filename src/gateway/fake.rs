use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

use super::models::*;
use super::traits::{GatewayResult, PaymentGateway};
use crate::error::GatewayError;

/// Scripted gateway for unit tests; records every call it receives
#[derive(Default)]
pub struct FakeGateway {
    customers: Mutex<HashMap<String, Customer>>,
    payment_intents: Mutex<HashMap<String, PaymentIntent>>,
    refunds: Mutex<HashMap<String, Vec<Refund>>>,
    invoices: Mutex<HashMap<String, Invoice>>,
    calls: Mutex<Vec<String>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_customer(&self, customer: Customer) {
        self.customers.lock().insert(customer.id.clone(), customer);
    }

    pub fn add_payment_intent(&self, intent: PaymentIntent) {
        self.payment_intents.lock().insert(intent.id.clone(), intent);
    }

    pub fn add_refund(&self, payment_intent_id: &str, id: &str, amount: i64) {
        self.refunds
            .lock()
            .entry(payment_intent_id.to_string())
            .or_default()
            .push(Refund {
                id: id.to_string(),
                amount,
                payment_intent: Some(payment_intent_id.to_string()),
                status: Some("succeeded".to_string()),
            });
    }

    pub fn add_invoice(&self, invoice: Invoice) {
        self.invoices.lock().insert(invoice.id.clone(), invoice);
    }

    pub fn customer(&self, customer_id: &str) -> Option<Customer> {
        self.customers.lock().get(customer_id).cloned()
    }

    pub fn payment_intent(&self, payment_intent_id: &str) -> Option<PaymentIntent> {
        self.payment_intents.lock().get(payment_intent_id).cloned()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().push(call);
    }

    fn missing(what: &str, id: &str) -> GatewayError {
        GatewayError::Api {
            status: 404,
            message: format!("No such {}: '{}'", what, id),
        }
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn find_customer_by_email(
        &self,
        account: &str,
        email: &str,
    ) -> GatewayResult<Option<Customer>> {
        self.record(format!("find_customer_by_email:{}:{}", account, email));
        Ok(self
            .customers
            .lock()
            .values()
            .find(|c| c.email.as_deref() == Some(email))
            .cloned())
    }

    async fn retrieve_customer(&self, account: &str, customer_id: &str) -> GatewayResult<Customer> {
        self.record(format!("retrieve_customer:{}:{}", account, customer_id));
        self.customer(customer_id)
            .ok_or_else(|| Self::missing("customer", customer_id))
    }

    async fn tag_customer_referral(
        &self,
        account: &str,
        customer_id: &str,
        referral_id: &str,
    ) -> GatewayResult<()> {
        self.record(format!("tag_customer_referral:{}:{}", account, customer_id));
        let mut customers = self.customers.lock();
        let customer = customers
            .get_mut(customer_id)
            .ok_or_else(|| Self::missing("customer", customer_id))?;
        customer
            .metadata
            .insert(REFERRAL_ID_KEY.to_string(), referral_id.to_string());
        Ok(())
    }

    async fn latest_payment_intent(
        &self,
        account: &str,
        customer_id: &str,
    ) -> GatewayResult<Option<PaymentIntent>> {
        self.record(format!("latest_payment_intent:{}:{}", account, customer_id));
        Ok(self
            .payment_intents
            .lock()
            .values()
            .filter(|pi| pi.customer.as_deref() == Some(customer_id))
            .max_by_key(|pi| pi.created)
            .cloned())
    }

    async fn retrieve_payment_intent(
        &self,
        account: &str,
        payment_intent_id: &str,
    ) -> GatewayResult<PaymentIntent> {
        self.record(format!("retrieve_payment_intent:{}:{}", account, payment_intent_id));
        self.payment_intent(payment_intent_id)
            .ok_or_else(|| Self::missing("payment_intent", payment_intent_id))
    }

    async fn tag_payment_intent_commission(
        &self,
        account: &str,
        payment_intent_id: &str,
        commission_id: &str,
    ) -> GatewayResult<()> {
        self.record(format!(
            "tag_payment_intent_commission:{}:{}",
            account, payment_intent_id
        ));
        let mut intents = self.payment_intents.lock();
        let intent = intents
            .get_mut(payment_intent_id)
            .ok_or_else(|| Self::missing("payment_intent", payment_intent_id))?;
        intent
            .metadata
            .insert(COMMISSION_ID_KEY.to_string(), commission_id.to_string());
        Ok(())
    }

    async fn list_refunds(
        &self,
        account: &str,
        payment_intent_id: &str,
    ) -> GatewayResult<Vec<Refund>> {
        self.record(format!("list_refunds:{}:{}", account, payment_intent_id));
        Ok(self
            .refunds
            .lock()
            .get(payment_intent_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn retrieve_invoice(&self, account: &str, invoice_id: &str) -> GatewayResult<Invoice> {
        self.record(format!("retrieve_invoice:{}:{}", account, invoice_id));
        self.invoices
            .lock()
            .get(invoice_id)
            .cloned()
            .ok_or_else(|| Self::missing("invoice", invoice_id))
    }
}
