use chrono::{TimeZone, Utc};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::calculator::{commission_amount, months_between, net_sale_amount};
use super::outcome::{CommissionOutcome, CommissionResult};
use crate::error::CommissionError;
use crate::gateway::models::WebhookEvent;
use crate::gateway::PaymentGateway;
use crate::store::models::Referral;
use crate::store::CommissionStore;

/// Reconciles gateway payments with referral commissions.
///
/// Every operation is a single pass: gateway reads, then at most one store
/// write. Nothing is retried; webhook senders redeliver on transport errors.
pub struct CommissionService {
    pub(super) gateway: Arc<dyn PaymentGateway>,
    pub(super) store: Arc<dyn CommissionStore>,
}

impl CommissionService {
    pub fn new(gateway: Arc<dyn PaymentGateway>, store: Arc<dyn CommissionStore>) -> Self {
        Self { gateway, store }
    }

    /// Attribute a referred customer's latest payment to the referral
    #[instrument(skip(self, referral, email), fields(referral_id = %referral_id, account = %stripe_id))]
    pub async fn create_commission(
        &self,
        referral: &Referral,
        stripe_id: &str,
        referral_id: &str,
        email: &str,
    ) -> CommissionResult {
        let customer = self
            .gateway
            .find_customer_by_email(stripe_id, email)
            .await?
            .ok_or_else(|| CommissionError::CustomerNotFound {
                email: email.to_string(),
            })?;

        self.gateway
            .tag_customer_referral(stripe_id, &customer.id, &referral.referral_id)
            .await?;

        if customer.email.as_deref() != Some(email) {
            return Err(CommissionError::CustomerEmailMismatch {
                customer_id: customer.id,
                email: email.to_string(),
            });
        }

        let payment_intent = self
            .gateway
            .latest_payment_intent(stripe_id, &customer.id)
            .await?
            .ok_or(CommissionError::PaymentShapeUnknown {
                payment_intent_id: None,
            })?;

        if let Some(commission_id) = payment_intent.commission_id() {
            if let Some(existing) = self.store.get_commission(commission_id).await? {
                info!(
                    "Payment intent {} already attributed to commission {} (finalized: {})",
                    payment_intent.id,
                    existing.commission_id,
                    existing.is_finalized()
                );
                return Ok(CommissionOutcome::CommissionExists);
            }
        }

        if let Some(invoice_id) = payment_intent.invoice.as_deref() {
            self.invoice_payment(referral, referral_id, stripe_id, invoice_id)
                .await
        } else if payment_intent.has_charges() {
            self.charge_payment(referral, referral_id, stripe_id, &payment_intent)
                .await
        } else {
            Err(CommissionError::PaymentShapeUnknown {
                payment_intent_id: Some(payment_intent.id),
            })
        }
    }

    /// Recompute an attributed commission after refunds or amount changes
    #[instrument(skip(self, event), fields(event_id = ?event.id))]
    pub async fn edit_commission(&self, event: &WebhookEvent) -> CommissionResult {
        let payment = event
            .payment_object()
            .ok_or(CommissionError::NoPaymentObject)?;
        let payment_intent_id = payment
            .payment_intent
            .as_deref()
            .ok_or(CommissionError::MissingPaymentIntent)?;
        let account = event.account_id();

        let payment_intent = self
            .gateway
            .retrieve_payment_intent(account, payment_intent_id)
            .await?;

        let commission_id = payment_intent.commission_id().ok_or_else(|| {
            CommissionError::NoCommissionId {
                payment_intent_id: payment_intent_id.to_string(),
            }
        })?;

        let commission = self
            .store
            .get_commission(commission_id)
            .await?
            .ok_or_else(|| CommissionError::CommissionNotFound(commission_id.to_string()))?;

        let (referral, refunds) = futures::try_join!(
            async {
                self.store
                    .get_referral(&commission.referral_id)
                    .await
                    .map_err(CommissionError::from)
            },
            async {
                self.gateway
                    .list_refunds(account, payment_intent_id)
                    .await
                    .map_err(CommissionError::from)
            },
        )?;

        let referral = referral
            .ok_or_else(|| CommissionError::ReferralNotFound(commission.referral_id.clone()))?;

        let net_amount = net_sale_amount(payment.amount, &refunds);
        let total = commission_amount(
            net_amount,
            referral.commission_type,
            referral.commission_value,
        )?;

        let updated = self
            .store
            .update_commission_amounts(commission_id, net_amount, total)
            .await?;
        if updated == 0 {
            return Err(CommissionError::CommissionNotFound(commission_id.to_string()));
        }

        info!(
            "✓ Commission {} recomputed: net={} total={} ({} refunds)",
            commission_id,
            net_amount,
            total,
            refunds.len()
        );

        Ok(CommissionOutcome::Success)
    }

    /// Attribute a recurring payment while the referral's commission period lasts
    #[instrument(skip(self, event), fields(event_id = ?event.id))]
    pub async fn find_commission(&self, event: &WebhookEvent) -> CommissionResult {
        let payment = event
            .payment_object()
            .ok_or(CommissionError::NoPaymentObject)?;
        if payment.payment_intent.is_none() {
            return Err(CommissionError::NoPaymentIntent);
        }
        let customer_id = payment
            .customer
            .as_deref()
            .ok_or(CommissionError::NoCustomer)?;
        let account = event.account_id();

        let customer = self.gateway.retrieve_customer(account, customer_id).await?;
        let referral_id = customer
            .referral_id()
            .ok_or_else(|| CommissionError::NoReferralMetadata {
                customer_id: customer.id.clone(),
            })?;

        let referral = self
            .store
            .get_referral(referral_id)
            .await?
            .ok_or_else(|| CommissionError::ReferralNotFound(referral_id.to_string()))?;

        let anchor = self
            .store
            .earliest_commission(&referral.referral_id)
            .await?
            .ok_or_else(|| CommissionError::NoAnchorCommission {
                referral_id: referral.referral_id.clone(),
            })?;

        let paid_at = Utc
            .timestamp_opt(payment.created, 0)
            .single()
            .ok_or(CommissionError::InvalidPaymentTimestamp(payment.created))?;

        let months = months_between(anchor.created, paid_at);
        if months >= i64::from(referral.commission_period) {
            warn!(
                "Referral {} is {} months into a {} month commission period",
                referral.referral_id, months, referral.commission_period
            );
            return Err(CommissionError::CommissionPeriodExceeded {
                referral_id: referral.referral_id.clone(),
                months,
                period: referral.commission_period,
            });
        }

        let invoice_id = payment
            .invoice
            .as_deref()
            .ok_or(CommissionError::NoInvoice)?;

        self.invoice_payment(&referral, &referral.referral_id, account, invoice_id)
            .await
    }

    /// Detach a removed gateway account from its company
    #[instrument(skip(self))]
    pub async fn delete_integration(&self, stripe_id: &str) -> CommissionResult {
        let cleared = self.store.clear_company_stripe_id(stripe_id).await?;

        if cleared == 0 {
            info!("No company linked to {}; integration already removed", stripe_id);
        } else {
            info!("✓ Integration {} removed from {} company", stripe_id, cleared);
        }

        Ok(CommissionOutcome::Success)
    }
}
