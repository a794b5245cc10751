//! ResumeSubscriptionHandler - Undo a pending cancellation during grace.

use std::sync::Arc;

use crate::domain::billing::{BillingError, Subscription};
use crate::domain::foundation::{SubscriptionId, Timestamp};
use crate::ports::{SubscriptionGateway, SubscriptionRepository, SubscriptionUpdate};

use super::{ensure_success, load_subscription};

/// Command to resume a cancelled subscription.
#[derive(Debug, Clone)]
pub struct ResumeSubscriptionCommand {
    pub subscription_id: SubscriptionId,
}

/// Result of a successful resume.
#[derive(Debug, Clone)]
pub struct ResumeSubscriptionResult {
    pub subscription: Subscription,
}

/// Handler for resuming subscriptions within their grace period.
pub struct ResumeSubscriptionHandler {
    repository: Arc<dyn SubscriptionRepository>,
    gateway: Arc<dyn SubscriptionGateway>,
}

impl ResumeSubscriptionHandler {
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
        cmd: ResumeSubscriptionCommand,
    ) -> Result<ResumeSubscriptionResult, BillingError> {
        let mut subscription =
            load_subscription(self.repository.as_ref(), &cmd.subscription_id).await?;

        resume(
            self.gateway.as_ref(),
            self.repository.as_ref(),
            &mut subscription,
            Timestamp::now(),
        )
        .await?;

        Ok(ResumeSubscriptionResult { subscription })
    }
}

/// Remove the gateway's billing-cycle cap and clear `ends_at`.
///
/// The grace-period check runs before any gateway call.
pub(crate) async fn resume(
    gateway: &dyn SubscriptionGateway,
    repository: &dyn SubscriptionRepository,
    subscription: &mut Subscription,
    now: Timestamp,
) -> Result<(), BillingError> {
    if !subscription.is_on_grace_period_at(now) {
        return Err(BillingError::precondition(
            "Unable to resume subscription that is not within grace period",
        ));
    }

    let result = gateway
        .update(
            &subscription.gateway_subscription_id,
            SubscriptionUpdate::new().never_expires(),
        )
        .await?;
    ensure_success(result)?;

    subscription.resume_at(now)?;
    repository.update(subscription).await?;

    tracing::info!(
        subscription_id = %subscription.id,
        gateway_subscription_id = %subscription.gateway_subscription_id,
        "Subscription resumed"
    );
    Ok(())
}
