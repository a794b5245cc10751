//! HandleGatewayWebhookHandler - Verify, authorize and route gateway
//! notifications.
//!
//! The gateway retries deliveries that are not answered with 200, so this
//! handler never fails: every path ends in a `WebhookOutcome`, and drops and
//! internal failures are reported through `tracing` instead.

use std::sync::Arc;

use crate::ports::{NotificationParser, WebhookNotification};

use super::{DropReason, WebhookHandler, WebhookOutcome, WebhookRegistry};

/// Command carrying the raw form fields of a delivery.
#[derive(Debug, Clone)]
pub struct HandleGatewayWebhookCommand {
    pub signature: String,
    pub payload: String,
}

/// Dispatches verified notifications to the registered handlers.
pub struct HandleGatewayWebhookHandler {
    parser: Arc<dyn NotificationParser>,
    registry: WebhookRegistry,
    merchant_account_id: String,
}

impl HandleGatewayWebhookHandler {
    pub fn new(
        parser: Arc<dyn NotificationParser>,
        registry: WebhookRegistry,
        merchant_account_id: impl Into<String>,
    ) -> Self {
        Self {
            parser,
            registry,
            merchant_account_id: merchant_account_id.into(),
        }
    }

    pub async fn handle(&self, cmd: HandleGatewayWebhookCommand) -> WebhookOutcome {
        // 1. Verify and decode, then check the merchant account
        let notification = match self.authenticate(&cmd).await {
            Ok(notification) => notification,
            Err(reason) => {
                tracing::warn!(reason = %reason, "Webhook dropped");
                return WebhookOutcome::Dropped(reason);
            }
        };

        // 2. Route by kind
        let kind = &notification.kind;
        let handler_name = kind.handler_name();
        if !self.registry.is_registered(kind) {
            tracing::debug!(kind = %kind, handler = %handler_name, "No handler registered");
        }

        match self.registry.resolve(kind).handle(&notification).await {
            Ok(outcome) => {
                tracing::info!(
                    kind = %kind,
                    handler = %handler_name,
                    outcome = ?outcome,
                    "Webhook processed"
                );
                outcome
            }
            Err(error) => {
                tracing::error!(
                    kind = %kind,
                    handler = %handler_name,
                    error = %error,
                    retryable = error.is_retryable(),
                    "Webhook handler failed"
                );
                WebhookOutcome::Failed {
                    kind: kind.clone(),
                    error,
                }
            }
        }
    }

    async fn authenticate(
        &self,
        cmd: &HandleGatewayWebhookCommand,
    ) -> Result<WebhookNotification, DropReason> {
        let notification = self
            .parser
            .parse(&cmd.signature, &cmd.payload)
            .await
            .map_err(|e| DropReason::InvalidNotification(e.message))?;

        let subscription = notification
            .subscription
            .as_ref()
            .ok_or(DropReason::MissingSubscription)?;

        if subscription.merchant_account_id != self.merchant_account_id {
            return Err(DropReason::MerchantAccountMismatch {
                expected: self.merchant_account_id.clone(),
                received: subscription.merchant_account_id.clone(),
            });
        }

        Ok(notification)
    }
}
