use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use super::models::*;
use super::repository::{CommissionStore, StoreResult};
use crate::error::StoreError;

/// In-memory store used by unit tests in place of Postgres
pub struct MemoryCommissionStore {
    referrals: tokio::sync::RwLock<HashMap<String, Referral>>,
    commissions: tokio::sync::RwLock<HashMap<String, Commission>>,
    companies: tokio::sync::RwLock<HashMap<String, Company>>,
    fail_writes: AtomicBool,
}

impl MemoryCommissionStore {
    pub fn new() -> Self {
        Self {
            referrals: tokio::sync::RwLock::new(HashMap::new()),
            commissions: tokio::sync::RwLock::new(HashMap::new()),
            companies: tokio::sync::RwLock::new(HashMap::new()),
            fail_writes: AtomicBool::new(false),
        }
    }

    pub async fn add_referral(&self, referral: Referral) {
        self.referrals
            .write()
            .await
            .insert(referral.referral_id.clone(), referral);
    }

    pub async fn add_commission(&self, commission: Commission) {
        self.commissions
            .write()
            .await
            .insert(commission.commission_id.clone(), commission);
    }

    pub async fn add_company(&self, company: Company) {
        self.companies
            .write()
            .await
            .insert(company.company_id.clone(), company);
    }

    pub async fn commissions(&self) -> Vec<Commission> {
        self.commissions.read().await.values().cloned().collect()
    }

    pub async fn company(&self, company_id: &str) -> Option<Company> {
        self.companies.read().await.get(company_id).cloned()
    }

    /// Make every subsequent write fail like a dropped connection
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    fn check_writable(&self) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl CommissionStore for MemoryCommissionStore {
    async fn get_referral(&self, referral_id: &str) -> StoreResult<Option<Referral>> {
        Ok(self.referrals.read().await.get(referral_id).cloned())
    }

    async fn get_commission(&self, commission_id: &str) -> StoreResult<Option<Commission>> {
        Ok(self.commissions.read().await.get(commission_id).cloned())
    }

    async fn earliest_commission(&self, referral_id: &str) -> StoreResult<Option<Commission>> {
        Ok(self
            .commissions
            .read()
            .await
            .values()
            .filter(|c| c.referral_id == referral_id)
            .min_by_key(|c| c.created)
            .cloned())
    }

    async fn insert_commission(&self, commission: NewCommission) -> StoreResult<InsertOutcome> {
        self.check_writable()?;
        let mut commissions = self.commissions.write().await;

        let duplicate = commission.payment_intent_id.is_some()
            && commissions
                .values()
                .any(|c| c.payment_intent_id == commission.payment_intent_id);
        if duplicate {
            return Ok(InsertOutcome::Duplicate);
        }

        let row = Commission {
            commission_id: commission.commission_id,
            referral_id: commission.referral_id,
            company_id: commission.company_id,
            affiliate_id: commission.affiliate_id,
            payment_intent_id: commission.payment_intent_id,
            invoice_id: commission.invoice_id,
            commission_sale_value: commission.sale_value,
            commission_total: commission.total,
            paid_at: None,
            created: Utc::now(),
        };
        commissions.insert(row.commission_id.clone(), row.clone());
        Ok(InsertOutcome::Inserted(row))
    }

    async fn update_commission_amounts(
        &self,
        commission_id: &str,
        sale_value: i64,
        total: i64,
    ) -> StoreResult<u64> {
        self.check_writable()?;
        let mut commissions = self.commissions.write().await;
        match commissions.get_mut(commission_id) {
            Some(commission) => {
                commission.commission_sale_value = sale_value;
                commission.commission_total = total;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn clear_company_stripe_id(&self, stripe_id: &str) -> StoreResult<u64> {
        self.check_writable()?;
        let mut cleared = 0;
        for company in self.companies.write().await.values_mut() {
            if company.stripe_id.as_deref() == Some(stripe_id) {
                company.stripe_id = None;
                cleared += 1;
            }
        }
        Ok(cleared)
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}
