use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing::info;

use crate::{
    api::handler::{create_commission, delete_integration, health_check, stripe_webhook, AppState},
    config::Config,
    middleware::{create_cors_layer, rate_limit_middleware, RateLimitLayer},
};

pub fn create_app(state: AppState, config: &Config) -> Router {
    info!("⚙️ Setting up HTTP routes...");

    let rate_limit = RateLimitLayer::per_minute(config.rate_limit_per_minute);

    let app = Router::new()
        // Public health check endpoint
        .route("/health", get(health_check))
        // API v1 routes
        .nest(
            "/api/v1",
            Router::new()
                // Gateway webhooks, outside the rate limit
                .route("/webhook/stripe", post(stripe_webhook))
                // Dashboard operations, reached only through the dashboard backend
                .merge(
                    Router::new()
                        .route("/commissions", post(create_commission))
                        .route("/integrations/stripe/:stripe_id", delete(delete_integration))
                        .layer(from_fn_with_state(rate_limit, rate_limit_middleware)),
                ),
        )
        .layer(CompressionLayer::new())
        .layer(create_cors_layer(&config.allowed_origins()))
        // Add request tracing
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("✓ HTTP routes configured");
    app
}

pub async fn run_server(app: Router, bind_address: &str) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    info!("🌐 Server listening on: {}", bind_address);

    axum::serve(listener, app).await
}
