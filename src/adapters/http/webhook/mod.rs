//! HTTP adapter for gateway webhook deliveries.
//!
//! Exposes `POST /webhooks/gateway` accepting the form fields
//! `bt_signature` and `bt_payload`.

mod dto;
mod handlers;
mod routes;

pub use dto::GatewayWebhookForm;
pub use handlers::{handle_gateway_webhook, WebhookAppState};
pub use routes::{webhook_router, webhook_routes};
