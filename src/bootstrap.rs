use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{sync::Arc, time::Duration};
use tracing::{info, warn};

use crate::{
    api::AppState,
    commission::CommissionService,
    config::Config,
    error::AppResult,
    gateway::{PaymentGateway, StripeGateway},
    store::{CommissionStore, PgCommissionStore},
};

pub async fn initialize_app_state(config: &Config) -> AppResult<AppState> {
    info!("Initializing application components ...");

    // Database pool
    let pool = initialize_database(&config.database_url, config.db_max_connections).await?;
    let store: Arc<dyn CommissionStore> = Arc::new(PgCommissionStore::new(pool));

    // Payment gateway
    if config.stripe_secret_key.is_empty() {
        warn!("⚠️  STRIPE_SECRET_KEY not set - gateway calls will be rejected");
    }
    let gateway: Arc<dyn PaymentGateway> = Arc::new(StripeGateway::new(&config.stripe_settings())?);
    info!(
        "✅ {} gateway client initialized ({})",
        gateway.name(),
        config.stripe_api_base
    );

    let commissions = Arc::new(CommissionService::new(gateway, store.clone()));
    info!("✅ Commission service initialized");

    Ok(AppState { commissions, store })
}

async fn initialize_database(database_url: &str, max_connections: u32) -> AppResult<PgPool> {
    info!("📊 Connecting to database...");

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(database_url)
        .await?;

    info!("✓ Database pool configured: {} max connections", max_connections);

    // Run migrations
    info!("🔄 Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;

    info!("✓ Database initialized");
    Ok(pool)
}
