use tracing::{info, instrument, warn};

use super::calculator::commission_amount;
use super::outcome::{CommissionOutcome, CommissionResult};
use super::service::CommissionService;
use crate::gateway::models::PaymentIntent;
use crate::store::models::{InsertOutcome, NewCommission, Referral};

impl CommissionService {
    /// Attribute a paid invoice to a referral
    #[instrument(skip(self, referral), fields(referral_id = %referral_id))]
    pub async fn invoice_payment(
        &self,
        referral: &Referral,
        referral_id: &str,
        account: &str,
        invoice_id: &str,
    ) -> CommissionResult {
        let invoice = self.gateway.retrieve_invoice(account, invoice_id).await?;

        let sale_value = invoice.amount_paid;
        let total = commission_amount(
            sale_value,
            referral.commission_type,
            referral.commission_value,
        )?;

        let commission = NewCommission::for_referral(
            referral,
            referral_id,
            invoice.payment_intent.clone(),
            Some(invoice.id.clone()),
            sale_value,
            total,
        );

        self.record_commission(account, commission).await
    }

    /// Attribute a one-off charge to a referral
    #[instrument(skip(self, referral, payment_intent), fields(referral_id = %referral_id, payment_intent_id = %payment_intent.id))]
    pub async fn charge_payment(
        &self,
        referral: &Referral,
        referral_id: &str,
        account: &str,
        payment_intent: &PaymentIntent,
    ) -> CommissionResult {
        let sale_value = payment_intent.sale_amount();
        let total = commission_amount(
            sale_value,
            referral.commission_type,
            referral.commission_value,
        )?;

        let commission = NewCommission::for_referral(
            referral,
            referral_id,
            Some(payment_intent.id.clone()),
            payment_intent.invoice.clone(),
            sale_value,
            total,
        );

        self.record_commission(account, commission).await
    }

    /// Insert first, tag the payment intent only once the row exists
    async fn record_commission(&self, account: &str, commission: NewCommission) -> CommissionResult {
        let payment_intent_id = commission.payment_intent_id.clone();

        let row = match self.store.insert_commission(commission).await? {
            InsertOutcome::Inserted(row) => row,
            InsertOutcome::Duplicate => {
                warn!(
                    "Commission already recorded for payment intent {:?}",
                    payment_intent_id
                );
                return Ok(CommissionOutcome::CommissionExists);
            }
        };

        if let Some(payment_intent_id) = row.payment_intent_id.as_deref() {
            self.gateway
                .tag_payment_intent_commission(account, payment_intent_id, &row.commission_id)
                .await?;
        }

        info!(
            "✓ Commission {} recorded: sale={} total={}",
            row.commission_id, row.commission_sale_value, row.commission_total
        );

        Ok(CommissionOutcome::Success)
    }
}
