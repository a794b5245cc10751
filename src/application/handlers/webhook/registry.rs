//! Webhook handler registry.
//!
//! Maps each `WebhookKind` to the handler that processes it. Kinds without a
//! registration go to the default handler, which acknowledges and does
//! nothing.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::billing::{BillingError, WebhookKind};
use crate::ports::{SubscriptionRepository, WebhookNotification};

use super::cancellation::CancelOnNotificationHandler;
use super::WebhookOutcome;

/// Processes one kind of verified notification.
#[async_trait]
pub trait WebhookHandler: Send + Sync {
    async fn handle(
        &self,
        notification: &WebhookNotification,
    ) -> Result<WebhookOutcome, BillingError>;
}

/// Fallback for unregistered kinds.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcknowledgeWebhookHandler;

#[async_trait]
impl WebhookHandler for AcknowledgeWebhookHandler {
    async fn handle(
        &self,
        _notification: &WebhookNotification,
    ) -> Result<WebhookOutcome, BillingError> {
        Ok(WebhookOutcome::Acknowledged)
    }
}

/// Kind → handler lookup table.
#[derive(Clone)]
pub struct WebhookRegistry {
    handlers: HashMap<WebhookKind, Arc<dyn WebhookHandler>>,
    default: Arc<dyn WebhookHandler>,
}

impl WebhookRegistry {
    /// Empty registry; every kind is acknowledged.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            default: Arc::new(AcknowledgeWebhookHandler),
        }
    }

    /// Registry with the cancellation-class handlers
    /// (`subscription_canceled`, `subscription_expired`).
    pub fn with_cancellation_handlers(repository: Arc<dyn SubscriptionRepository>) -> Self {
        let cancel: Arc<dyn WebhookHandler> = Arc::new(CancelOnNotificationHandler::new(repository));
        Self::new()
            .register(WebhookKind::SubscriptionCanceled, cancel.clone())
            .register(WebhookKind::SubscriptionExpired, cancel)
    }

    /// Register `handler` for `kind`, replacing any previous registration.
    pub fn register(mut self, kind: WebhookKind, handler: Arc<dyn WebhookHandler>) -> Self {
        self.handlers.insert(kind, handler);
        self
    }

    /// Replace the fallback handler.
    pub fn with_default(mut self, handler: Arc<dyn WebhookHandler>) -> Self {
        self.default = handler;
        self
    }

    pub fn is_registered(&self, kind: &WebhookKind) -> bool {
        self.handlers.contains_key(kind)
    }

    /// Handler for `kind`, or the default.
    pub fn resolve(&self, kind: &WebhookKind) -> &Arc<dyn WebhookHandler> {
        self.handlers.get(kind).unwrap_or(&self.default)
    }
}

impl Default for WebhookRegistry {
    fn default() -> Self {
        Self::new()
    }
}
