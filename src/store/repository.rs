use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{info, instrument};

use super::models::*;
use crate::error::StoreError;

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence for referrals, commissions and companies.
///
/// The database is the source of truth; gateway metadata only mirrors it.
#[async_trait]
pub trait CommissionStore: Send + Sync {
    async fn get_referral(&self, referral_id: &str) -> StoreResult<Option<Referral>>;

    async fn get_commission(&self, commission_id: &str) -> StoreResult<Option<Commission>>;

    /// Oldest commission of a referral, the anchor of its billing cycle
    async fn earliest_commission(&self, referral_id: &str) -> StoreResult<Option<Commission>>;

    /// Insert unless a row already exists for the same payment intent
    async fn insert_commission(&self, commission: NewCommission) -> StoreResult<InsertOutcome>;

    /// Returns the number of rows updated
    async fn update_commission_amounts(
        &self,
        commission_id: &str,
        sale_value: i64,
        total: i64,
    ) -> StoreResult<u64>;

    /// Returns the number of companies detached
    async fn clear_company_stripe_id(&self, stripe_id: &str) -> StoreResult<u64>;

    async fn health_check(&self) -> StoreResult<()>;
}

const COMMISSION_COLUMNS: &str = "commission_id, referral_id, company_id, affiliate_id, \
    payment_intent_id, invoice_id, commission_sale_value, commission_total, paid_at, created";

/// Postgres-backed commission store
pub struct PgCommissionStore {
    pub pool: PgPool,
}

impl PgCommissionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommissionStore for PgCommissionStore {
    async fn get_referral(&self, referral_id: &str) -> StoreResult<Option<Referral>> {
        let referral = sqlx::query_as::<_, Referral>(
            r#"
            SELECT referral_id, company_id, affiliate_id, commission_value,
                   commission_type, commission_period, created
            FROM referrals
            WHERE referral_id = $1
            "#,
        )
        .bind(referral_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(referral)
    }

    async fn get_commission(&self, commission_id: &str) -> StoreResult<Option<Commission>> {
        let commission = sqlx::query_as::<_, Commission>(&format!(
            "SELECT {} FROM commissions WHERE commission_id = $1",
            COMMISSION_COLUMNS
        ))
        .bind(commission_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(commission)
    }

    async fn earliest_commission(&self, referral_id: &str) -> StoreResult<Option<Commission>> {
        let commission = sqlx::query_as::<_, Commission>(&format!(
            "SELECT {} FROM commissions WHERE referral_id = $1 ORDER BY created ASC LIMIT 1",
            COMMISSION_COLUMNS
        ))
        .bind(referral_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(commission)
    }

    #[instrument(skip(self, commission), fields(commission_id = %commission.commission_id))]
    async fn insert_commission(&self, commission: NewCommission) -> StoreResult<InsertOutcome> {
        let inserted = sqlx::query_as::<_, Commission>(&format!(
            r#"
            INSERT INTO commissions (
                commission_id, referral_id, company_id, affiliate_id,
                payment_intent_id, invoice_id, commission_sale_value, commission_total
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (payment_intent_id) DO NOTHING
            RETURNING {}
            "#,
            COMMISSION_COLUMNS
        ))
        .bind(&commission.commission_id)
        .bind(&commission.referral_id)
        .bind(&commission.company_id)
        .bind(&commission.affiliate_id)
        .bind(&commission.payment_intent_id)
        .bind(&commission.invoice_id)
        .bind(commission.sale_value)
        .bind(commission.total)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match inserted {
            Some(row) => {
                info!("Commission inserted for referral {}", row.referral_id);
                InsertOutcome::Inserted(row)
            }
            None => InsertOutcome::Duplicate,
        })
    }

    async fn update_commission_amounts(
        &self,
        commission_id: &str,
        sale_value: i64,
        total: i64,
    ) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE commissions
            SET commission_sale_value = $2, commission_total = $3
            WHERE commission_id = $1
            "#,
        )
        .bind(commission_id)
        .bind(sale_value)
        .bind(total)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn clear_company_stripe_id(&self, stripe_id: &str) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE companies
            SET stripe_id = NULL
            WHERE stripe_id = $1
            "#,
        )
        .bind(stripe_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
