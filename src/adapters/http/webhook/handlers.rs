//! HTTP handler for gateway webhook deliveries.
//!
//! Every response is 200. A non-2xx answer would make the gateway retry a
//! delivery that will never succeed.

use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, State},
    response::{IntoResponse, Response},
    Form,
};
use http::StatusCode;

use crate::application::handlers::webhook::{
    HandleGatewayWebhookCommand, HandleGatewayWebhookHandler, WebhookRegistry,
};
use crate::ports::{NotificationParser, SubscriptionRepository};

use super::dto::GatewayWebhookForm;

// ════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════

/// Shared state for the webhook endpoint.
///
/// The dispatcher is built once and shared by every request.
#[derive(Clone)]
pub struct WebhookAppState {
    pub handler: Arc<HandleGatewayWebhookHandler>,
}

impl WebhookAppState {
    /// State with the cancellation handlers registered against `repository`.
    pub fn new(
        repository: Arc<dyn SubscriptionRepository>,
        notification_parser: Arc<dyn NotificationParser>,
        merchant_account_id: impl Into<String>,
    ) -> Self {
        Self::from_handler(HandleGatewayWebhookHandler::new(
            notification_parser,
            WebhookRegistry::with_cancellation_handlers(repository),
            merchant_account_id,
        ))
    }

    /// State around a dispatcher with a custom registry.
    pub fn from_handler(handler: HandleGatewayWebhookHandler) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /webhooks/gateway - Handle a gateway notification
pub async fn handle_gateway_webhook(
    State(state): State<WebhookAppState>,
    form: Result<Form<GatewayWebhookForm>, FormRejection>,
) -> Response {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "Webhook dropped: unreadable body");
            return acknowledge("");
        }
    };

    let Some((signature, payload)) = form.into_parts() else {
        tracing::warn!("Webhook dropped: missing bt_signature or bt_payload");
        return acknowledge("");
    };

    let outcome = state
        .handler
        .handle(HandleGatewayWebhookCommand { signature, payload })
        .await;

    acknowledge(outcome.response_body())
}

fn acknowledge(body: &'static str) -> Response {
    (StatusCode::OK, body).into_response()
}
