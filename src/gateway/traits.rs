use async_trait::async_trait;

use super::models::{Customer, Invoice, PaymentIntent, Refund};
use crate::error::GatewayError;

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Payment processor operations, each scoped to a connected merchant account.
///
/// An empty `account` addresses the platform account itself.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    fn name(&self) -> &'static str;

    async fn find_customer_by_email(
        &self,
        account: &str,
        email: &str,
    ) -> GatewayResult<Option<Customer>>;

    async fn retrieve_customer(&self, account: &str, customer_id: &str) -> GatewayResult<Customer>;

    async fn tag_customer_referral(
        &self,
        account: &str,
        customer_id: &str,
        referral_id: &str,
    ) -> GatewayResult<()>;

    /// Most recent payment intent of a customer
    async fn latest_payment_intent(
        &self,
        account: &str,
        customer_id: &str,
    ) -> GatewayResult<Option<PaymentIntent>>;

    async fn retrieve_payment_intent(
        &self,
        account: &str,
        payment_intent_id: &str,
    ) -> GatewayResult<PaymentIntent>;

    async fn tag_payment_intent_commission(
        &self,
        account: &str,
        payment_intent_id: &str,
        commission_id: &str,
    ) -> GatewayResult<()>;

    /// Up to 100 refunds issued against a payment intent
    async fn list_refunds(&self, account: &str, payment_intent_id: &str)
        -> GatewayResult<Vec<Refund>>;

    async fn retrieve_invoice(&self, account: &str, invoice_id: &str) -> GatewayResult<Invoice>;
}
