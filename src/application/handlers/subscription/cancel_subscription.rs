//! CancelSubscriptionHandler - Cancel at period end or immediately.

use std::sync::Arc;

use crate::domain::billing::{BillingError, Subscription};
use crate::domain::foundation::{SubscriptionId, Timestamp};
use crate::ports::{SubscriptionGateway, SubscriptionRepository, SubscriptionUpdate};

use super::{ensure_success, load_subscription};

/// When the cancellation takes effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelMode {
    /// Keep access until the paid period ends. Trials still end immediately.
    AtPeriodEnd,

    /// End access now.
    Now,
}

/// Command to cancel a subscription.
#[derive(Debug, Clone)]
pub struct CancelSubscriptionCommand {
    pub subscription_id: SubscriptionId,
    pub mode: CancelMode,
}

impl CancelSubscriptionCommand {
    pub fn at_period_end(subscription_id: SubscriptionId) -> Self {
        Self {
            subscription_id,
            mode: CancelMode::AtPeriodEnd,
        }
    }

    pub fn now(subscription_id: SubscriptionId) -> Self {
        Self {
            subscription_id,
            mode: CancelMode::Now,
        }
    }
}

/// Result of a successful cancellation.
#[derive(Debug, Clone)]
pub struct CancelSubscriptionResult {
    pub subscription: Subscription,
    /// When access ends.
    pub ends_at: Timestamp,
}

/// Handler for cancelling subscriptions.
pub struct CancelSubscriptionHandler {
    repository: Arc<dyn SubscriptionRepository>,
    gateway: Arc<dyn SubscriptionGateway>,
}

impl CancelSubscriptionHandler {
    pub fn new(
        repository: Arc<dyn SubscriptionRepository>,
        gateway: Arc<dyn SubscriptionGateway>,
    ) -> Self {
        Self {
            repository,
            gateway,
        }
    }

    pub async fn handle(
        &self,
        cmd: CancelSubscriptionCommand,
    ) -> Result<CancelSubscriptionResult, BillingError> {
        let now = Timestamp::now();
        let mut subscription =
            load_subscription(self.repository.as_ref(), &cmd.subscription_id).await?;

        let immediate = cmd.mode == CancelMode::Now || subscription.is_on_trial_at(now);
        if immediate {
            cancel_now(
                self.gateway.as_ref(),
                self.repository.as_ref(),
                &mut subscription,
                now,
            )
            .await?;
        } else {
            self.cancel_at_period_end(&mut subscription, now).await?;
        }

        let ends_at = subscription.ends_at.unwrap_or(now);
        Ok(CancelSubscriptionResult {
            subscription,
            ends_at,
        })
    }

    async fn cancel_at_period_end(
        &self,
        subscription: &mut Subscription,
        now: Timestamp,
    ) -> Result<(), BillingError> {
        let remote = self
            .gateway
            .find(&subscription.gateway_subscription_id)
            .await?;

        let update = SubscriptionUpdate::new().cap_billing_cycles(remote.current_billing_cycle);
        let result = self
            .gateway
            .update(&subscription.gateway_subscription_id, update)
            .await?;
        ensure_success(result)?;

        let ends_at = Timestamp::from_date(remote.billing_period_end_date);
        subscription.end_at(ends_at, now);
        self.repository.update(subscription).await?;

        tracing::info!(
            subscription_id = %subscription.id,
            gateway_subscription_id = %subscription.gateway_subscription_id,
            ends_at = %ends_at.as_datetime(),
            "Subscription cancelled at period end"
        );
        Ok(())
    }
}

/// Cancel at the gateway immediately and mark the record cancelled at `now`.
pub(crate) async fn cancel_now(
    gateway: &dyn SubscriptionGateway,
    repository: &dyn SubscriptionRepository,
    subscription: &mut Subscription,
    now: Timestamp,
) -> Result<(), BillingError> {
    let result = gateway.cancel(&subscription.gateway_subscription_id).await?;
    ensure_success(result)?;

    subscription.mark_cancelled_at(now);
    repository.update(subscription).await?;

    tracing::info!(
        subscription_id = %subscription.id,
        gateway_subscription_id = %subscription.gateway_subscription_id,
        "Subscription cancelled immediately"
    );
    Ok(())
}
