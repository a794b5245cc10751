//! Axum router configuration for the gateway webhook endpoint.

use axum::{routing::post, Router};
use tower_http::trace::TraceLayer;

use super::handlers::{handle_gateway_webhook, WebhookAppState};

/// Create the webhook router.
///
/// Webhooks carry no user authentication; they are verified by the
/// notification parser.
///
/// # Routes
/// - `POST /gateway` - Handle gateway notifications
pub fn webhook_routes() -> Router<WebhookAppState> {
    Router::new().route("/gateway", post(handle_gateway_webhook))
}

/// Create the complete webhook router, mounted at `/webhooks`, with request
/// tracing.
///
/// # Example
///
/// ```ignore
/// let state = WebhookAppState::new(repository, parser, config.gateway.merchant_account_id);
/// let app = Router::new().merge(webhook_router(state));
/// ```
pub fn webhook_router(state: WebhookAppState) -> Router {
    Router::new()
        .nest("/webhooks", webhook_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
