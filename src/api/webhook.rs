use tracing::{error, info, warn};

use super::models::WebhookResponse;
use crate::commission::{CommissionService, ReconciliationStatus};
use crate::error::{AppError, AppResult, CommissionError};
use crate::gateway::models::WebhookEvent;

/// Status reported for events this service does not handle
pub const IGNORED_STATUS: &str = "ignored";

/// What a gateway event type asks the reconciliation service to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookAction {
    FindCommission,
    EditCommission,
    DeleteIntegration,
    Ignore,
}

impl WebhookAction {
    pub fn from_event_type(event_type: &str) -> Self {
        match event_type {
            "charge.succeeded" => WebhookAction::FindCommission,
            "charge.refunded" | "charge.refund.updated" => WebhookAction::EditCommission,
            "account.application.deauthorized" => WebhookAction::DeleteIntegration,
            _ => WebhookAction::Ignore,
        }
    }
}

/// Route a webhook event to its reconciliation operation.
///
/// Business-level misses become a status string; transport failures surface
/// as `AppError` so the sender redelivers.
pub async fn dispatch_event(
    service: &CommissionService,
    event: &WebhookEvent,
) -> AppResult<WebhookResponse> {
    let event_type = event.event_type.clone();
    let action = event_type
        .as_deref()
        .map(WebhookAction::from_event_type)
        .unwrap_or(WebhookAction::Ignore);

    info!("📥 Webhook {:?} ({:?}) -> {:?}", event.id, event_type, action);

    let result = match action {
        WebhookAction::FindCommission => service.find_commission(event).await,
        WebhookAction::EditCommission => service.edit_commission(event).await,
        WebhookAction::DeleteIntegration => match event.account.as_deref() {
            Some(account) if !account.is_empty() => service.delete_integration(account).await,
            _ => Err(CommissionError::NoAccount),
        },
        WebhookAction::Ignore => {
            return Ok(WebhookResponse {
                accepted: false,
                event_type,
                status: IGNORED_STATUS.to_string(),
            });
        }
    };

    let status = match result {
        Ok(outcome) => outcome.status(),
        Err(e) if e.is_transport() => {
            error!("Webhook {:?} failed in transport: {}", event.id, e);
            return Err(AppError::from(e));
        }
        Err(e) => {
            warn!("Webhook {:?} not reconciled: {}", event.id, e);
            e.status()
        }
    };

    Ok(WebhookResponse {
        accepted: status != ReconciliationStatus::Error,
        event_type,
        status: status.as_str().to_string(),
    })
}
