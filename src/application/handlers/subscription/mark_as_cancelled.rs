//! MarkAsCancelledHandler - Record a cancellation that already happened at
//! the gateway.

use std::sync::Arc;

use crate::domain::billing::{BillingError, Subscription};
use crate::domain::foundation::{SubscriptionId, Timestamp};
use crate::ports::SubscriptionRepository;

use super::load_subscription;

#[derive(Debug, Clone)]
pub struct MarkAsCancelledCommand {
    pub subscription_id: SubscriptionId,
}

/// Sets `ends_at` to now and persists. No gateway call is made.
pub struct MarkAsCancelledHandler {
    repository: Arc<dyn SubscriptionRepository>,
}

impl MarkAsCancelledHandler {
    pub fn new(repository: Arc<dyn SubscriptionRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, cmd: MarkAsCancelledCommand) -> Result<Subscription, BillingError> {
        let mut subscription =
            load_subscription(self.repository.as_ref(), &cmd.subscription_id).await?;

        subscription.mark_cancelled_at(Timestamp::now());
        self.repository.update(&mut subscription).await?;

        Ok(subscription)
    }
}
