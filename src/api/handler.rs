use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::models::*;
use super::webhook::dispatch_event;
use crate::{
    commission::CommissionService,
    error::{AppError, AppResult},
    gateway::models::WebhookEvent,
    middleware::validate_payload,
    store::CommissionStore,
};

#[derive(Clone)]
pub struct AppState {
    pub commissions: Arc<CommissionService>,
    pub store: Arc<dyn CommissionStore>,
}

/// Gateway webhook receiver
/// POST /api/v1/webhook/stripe
pub async fn stripe_webhook(
    State(state): State<AppState>,
    Json(event): Json<WebhookEvent>,
) -> AppResult<Json<WebhookResponse>> {
    let response = dispatch_event(&state.commissions, &event).await?;
    Ok(Json(response))
}

/// Attribute a referred customer's latest payment
/// POST /api/v1/commissions
pub async fn create_commission(
    State(state): State<AppState>,
    Json(request): Json<CreateCommissionRequest>,
) -> AppResult<Json<CommissionStatusResponse>> {
    validate_payload(&request)?;

    info!(
        "Creating commission for referral {} on account {}",
        request.referral_id, request.stripe_id
    );

    let referral = state
        .store
        .get_referral(&request.referral_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("referral {}", request.referral_id)))?;

    let result = state
        .commissions
        .create_commission(
            &referral,
            &request.stripe_id,
            &request.referral_id,
            &request.email,
        )
        .await;

    let status = match result {
        Ok(outcome) => outcome.status(),
        Err(e) if e.is_transport() => {
            error!("Commission creation for {} failed: {}", request.referral_id, e);
            return Err(e.into());
        }
        Err(e) => {
            warn!("Commission not created for {}: {}", request.referral_id, e);
            e.status()
        }
    };

    Ok(Json(status.into()))
}

/// Detach a company's gateway account
/// DELETE /api/v1/integrations/stripe/:stripe_id
pub async fn delete_integration(
    State(state): State<AppState>,
    Path(stripe_id): Path<String>,
) -> AppResult<Json<CommissionStatusResponse>> {
    let outcome = state.commissions.delete_integration(&stripe_id).await?;
    Ok(Json(outcome.status().into()))
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> AppResult<Json<HealthResponse>> {
    let healthy = match state.store.health_check().await {
        Ok(()) => true,
        Err(e) => {
            warn!("Store health check failed: {}", e);
            false
        }
    };

    Ok(Json(HealthResponse {
        status: if healthy {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        timestamp: Utc::now(),
    }))
}

