use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use super::models::*;
use super::traits::{GatewayResult, PaymentGateway};
use crate::error::GatewayError;

/// Refund pages are capped at the gateway's maximum page size
const REFUND_PAGE_LIMIT: &str = "100";

#[derive(Debug, Clone)]
pub struct StripeSettings {
    pub secret_key: String,
    pub api_base: String,
    pub timeout: Duration,
}

/// REST client for a Stripe-compatible API acting on behalf of connected accounts
pub struct StripeGateway {
    http: Client,
    api_base: String,
    secret_key: String,
}

impl StripeGateway {
    pub fn new(settings: &StripeSettings) -> GatewayResult<Self> {
        let http = Client::builder()
            .use_rustls_tls()
            .timeout(settings.timeout)
            .build()?;

        Ok(Self {
            http,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            secret_key: settings.secret_key.clone(),
        })
    }

    fn request(&self, method: Method, path: &str, account: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}{}", self.api_base, path))
            .bearer_auth(&self.secret_key);

        if account.is_empty() {
            builder
        } else {
            builder.header("Stripe-Account", account)
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> GatewayResult<T> {
        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body: ApiErrorBody = response.json().await.unwrap_or_default();
            let message = body
                .error
                .message
                .or(body.error.error_type)
                .unwrap_or_else(|| status.to_string());
            warn!("Gateway request failed with {}: {}", status, message);
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

/// Form fields setting a single metadata key
pub fn metadata_form(key: &str, value: &str) -> Vec<(String, String)> {
    vec![(format!("metadata[{}]", key), value.to_string())]
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    fn name(&self) -> &'static str {
        "stripe"
    }

    async fn find_customer_by_email(
        &self,
        account: &str,
        email: &str,
    ) -> GatewayResult<Option<Customer>> {
        debug!("Looking up customer by email on account {}", account);
        let list: List<Customer> = self
            .send(
                self.request(Method::GET, "/v1/customers", account)
                    .query(&[("email", email), ("limit", "1")]),
            )
            .await?;

        Ok(list.data.into_iter().next())
    }

    async fn retrieve_customer(&self, account: &str, customer_id: &str) -> GatewayResult<Customer> {
        self.send(self.request(
            Method::GET,
            &format!("/v1/customers/{}", customer_id),
            account,
        ))
        .await
    }

    async fn tag_customer_referral(
        &self,
        account: &str,
        customer_id: &str,
        referral_id: &str,
    ) -> GatewayResult<()> {
        let _: Customer = self
            .send(
                self.request(
                    Method::POST,
                    &format!("/v1/customers/{}", customer_id),
                    account,
                )
                .form(&metadata_form(REFERRAL_ID_KEY, referral_id)),
            )
            .await?;
        Ok(())
    }

    async fn latest_payment_intent(
        &self,
        account: &str,
        customer_id: &str,
    ) -> GatewayResult<Option<PaymentIntent>> {
        let list: List<PaymentIntent> = self
            .send(
                self.request(Method::GET, "/v1/payment_intents", account)
                    .query(&[("customer", customer_id), ("limit", "1")]),
            )
            .await?;

        Ok(list.data.into_iter().next())
    }

    async fn retrieve_payment_intent(
        &self,
        account: &str,
        payment_intent_id: &str,
    ) -> GatewayResult<PaymentIntent> {
        self.send(self.request(
            Method::GET,
            &format!("/v1/payment_intents/{}", payment_intent_id),
            account,
        ))
        .await
    }

    async fn tag_payment_intent_commission(
        &self,
        account: &str,
        payment_intent_id: &str,
        commission_id: &str,
    ) -> GatewayResult<()> {
        let _: PaymentIntent = self
            .send(
                self.request(
                    Method::POST,
                    &format!("/v1/payment_intents/{}", payment_intent_id),
                    account,
                )
                .form(&metadata_form(COMMISSION_ID_KEY, commission_id)),
            )
            .await?;
        Ok(())
    }

    async fn list_refunds(
        &self,
        account: &str,
        payment_intent_id: &str,
    ) -> GatewayResult<Vec<Refund>> {
        let list: List<Refund> = self
            .send(
                self.request(Method::GET, "/v1/refunds", account).query(&[
                    ("payment_intent", payment_intent_id),
                    ("limit", REFUND_PAGE_LIMIT),
                ]),
            )
            .await?;

        if list.has_more {
            warn!(
                "Payment intent {} has more than {} refunds; only the first page is counted",
                payment_intent_id, REFUND_PAGE_LIMIT
            );
        }

        Ok(list.data)
    }

    async fn retrieve_invoice(&self, account: &str, invoice_id: &str) -> GatewayResult<Invoice> {
        self.send(self.request(
            Method::GET,
            &format!("/v1/invoices/{}", invoice_id),
            account,
        ))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> StripeSettings {
        StripeSettings {
            secret_key: "sk_test_123".to_string(),
            api_base: "https://api.stripe.test/".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_metadata_form() {
        let form = metadata_form(COMMISSION_ID_KEY, "com_1");
        assert_eq!(
            form,
            vec![("metadata[reflio_commission_id]".to_string(), "com_1".to_string())]
        );
    }

    #[test]
    fn test_account_header_scoping() {
        let gateway = StripeGateway::new(&settings()).unwrap();

        let scoped = gateway
            .request(Method::GET, "/v1/customers", "acct_1")
            .build()
            .unwrap();
        assert_eq!(scoped.url().as_str(), "https://api.stripe.test/v1/customers");
        assert_eq!(scoped.headers().get("Stripe-Account").unwrap(), "acct_1");
        assert!(scoped.headers().get("authorization").is_some());

        let platform = gateway
            .request(Method::GET, "/v1/customers", "")
            .build()
            .unwrap();
        assert!(platform.headers().get("Stripe-Account").is_none());
    }
}
