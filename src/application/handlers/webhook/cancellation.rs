//! Handler for cancellation-class notifications
//! (`subscription_canceled`, `subscription_expired`).

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::billing::BillingError;
use crate::domain::foundation::Timestamp;
use crate::ports::{SubscriptionRepository, WebhookNotification};

use super::{WebhookHandler, WebhookOutcome};

/// Attempts at writing the cancellation before a version conflict is reported.
const MAX_WRITE_ATTEMPTS: u32 = 3;

/// Marks the local subscription cancelled now.
///
/// Records that already ended are left alone, so redelivery is harmless.
/// Untracked gateway ids are still reported as handled. A concurrent write
/// between load and update is retried from a fresh load, since the gateway
/// does not redeliver an acknowledged notification.
pub struct CancelOnNotificationHandler {
    repository: Arc<dyn SubscriptionRepository>,
}

impl CancelOnNotificationHandler {
    pub fn new(repository: Arc<dyn SubscriptionRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl WebhookHandler for CancelOnNotificationHandler {
    async fn handle(
        &self,
        notification: &WebhookNotification,
    ) -> Result<WebhookOutcome, BillingError> {
        let Some(remote) = &notification.subscription else {
            return Ok(WebhookOutcome::Acknowledged);
        };

        let mut attempt = 1;
        loop {
            let Some(mut subscription) = self.repository.find_by_gateway_id(&remote.id).await?
            else {
                tracing::info!(
                    gateway_subscription_id = %remote.id,
                    kind = %notification.kind,
                    "Cancellation for untracked subscription"
                );
                return Ok(WebhookOutcome::Handled {
                    subscription_id: None,
                    changed: false,
                });
            };

            let now = Timestamp::now();
            if !subscription.should_cancel_on_notification_at(now) {
                return Ok(WebhookOutcome::Handled {
                    subscription_id: Some(subscription.id),
                    changed: false,
                });
            }

            subscription.mark_cancelled_at(now);
            match self.repository.update(&mut subscription).await.map_err(BillingError::from) {
                Ok(()) => {
                    tracing::info!(
                        subscription_id = %subscription.id,
                        gateway_subscription_id = %remote.id,
                        kind = %notification.kind,
                        attempt,
                        "Subscription marked cancelled from webhook"
                    );
                    return Ok(WebhookOutcome::Handled {
                        subscription_id: Some(subscription.id),
                        changed: true,
                    });
                }
                Err(BillingError::Conflict(message)) if attempt < MAX_WRITE_ATTEMPTS => {
                    tracing::debug!(
                        subscription_id = %subscription.id,
                        attempt,
                        message = %message,
                        "Cancellation write lost a version race, reloading"
                    );
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}
