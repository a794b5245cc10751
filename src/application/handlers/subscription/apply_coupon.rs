//! ApplyCouponHandler - Attach a gateway coupon to an active subscription.

use std::sync::Arc;

use crate::domain::billing::{BillingError, Discount, DiscountInstruction};
use crate::domain::foundation::{GatewayId, SubscriptionId, Timestamp};
use crate::ports::{SubscriptionGateway, SubscriptionRepository, SubscriptionUpdate};

use super::{ensure_success, load_subscription};

/// Command to apply a coupon.
#[derive(Debug, Clone)]
pub struct ApplyCouponCommand {
    pub subscription_id: SubscriptionId,
    pub coupon_id: GatewayId,

    /// Remove every discount currently on the subscription in the same update.
    pub remove_others: bool,
}

/// Result of a successful coupon application.
#[derive(Debug, Clone)]
pub struct ApplyCouponResult {
    pub subscription_id: SubscriptionId,
    pub coupon_id: GatewayId,
    pub removed_discounts: Vec<GatewayId>,

    /// Discounts reported by the gateway after the update, when returned.
    pub discounts: Vec<Discount>,
}

/// Handler for applying coupons. Local state is never mutated.
pub struct ApplyCouponHandler {
    repository: Arc<dyn SubscriptionRepository>,
    gateway: Arc<dyn SubscriptionGateway>,
}

impl ApplyCouponHandler {
    pub fn new(
        repository: Arc<dyn SubscriptionRepository>,
        gateway: Arc<dyn SubscriptionGateway>,
    ) -> Self {
        Self {
            repository,
            gateway,
        }
    }

    pub async fn handle(&self, cmd: ApplyCouponCommand) -> Result<ApplyCouponResult, BillingError> {
        let subscription =
            load_subscription(self.repository.as_ref(), &cmd.subscription_id).await?;

        if !subscription.is_active_at(Timestamp::now()) {
            return Err(BillingError::invalid_state(
                "Unable to apply coupon. Subscription not active",
            ));
        }

        let removed_discounts = if cmd.remove_others {
            self.gateway
                .find(&subscription.gateway_subscription_id)
                .await?
                .discounts
                .into_iter()
                .map(|d| d.id)
                .collect()
        } else {
            Vec::new()
        };

        let update = SubscriptionUpdate::new()
            .add_discount(DiscountInstruction::coupon(cmd.coupon_id.clone()))
            .remove_discounts(removed_discounts.clone());
        let result = self
            .gateway
            .update(&subscription.gateway_subscription_id, update)
            .await?;
        let result = ensure_success(result)?;

        tracing::info!(
            subscription_id = %subscription.id,
            coupon_id = %cmd.coupon_id,
            removed = removed_discounts.len(),
            "Coupon applied"
        );

        Ok(ApplyCouponResult {
            subscription_id: subscription.id,
            coupon_id: cmd.coupon_id,
            removed_discounts,
            discounts: result.subscription.map(|s| s.discounts).unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::gateway::MockSubscriptionGateway;
    use crate::adapters::memory::InMemorySubscriptionRepository;
    use crate::application::handlers::subscription::test_support::*;
    use crate::domain::foundation::Money;

    async fn setup(
        discounts: Vec<Discount>,
    ) -> (
        Arc<InMemorySubscriptionRepository>,
        MockSubscriptionGateway,
        ApplyCouponHandler,
        SubscriptionId,
    ) {
        let repo = Arc::new(InMemorySubscriptionRepository::new());
        let gateway = MockSubscriptionGateway::new();
        let sub = subscription("sub_1", "monthly-10");
        repo.save(&sub).await.unwrap();
        gateway.add_subscription(gateway_subscription(
            "sub_1",
            "monthly-10",
            days_from_today(15),
            discounts,
        ));
        let handler = ApplyCouponHandler::new(repo.clone(), Arc::new(gateway.clone()));
        (repo, gateway, handler, sub.id)
    }

    fn promo(id: &str) -> Discount {
        Discount {
            id: gid(id),
            amount: Money::from_cents(500),
            number_of_billing_cycles: 3,
        }
    }

    #[tokio::test]
    async fn applies_coupon_without_touching_others() {
        let (_repo, gateway, handler, id) = setup(vec![promo("OLD")]).await;

        let result = handler
            .handle(ApplyCouponCommand {
                subscription_id: id,
                coupon_id: gid("WELCOME"),
                remove_others: false,
            })
            .await
            .unwrap();

        assert!(result.removed_discounts.is_empty());
        assert!(!gateway.was_called("find"));
        let update = gateway.last_update().unwrap();
        assert!(update.add_discounts[0].inherited_from_id == "WELCOME");
        assert!(update.remove_discounts.is_empty());
        assert_eq!(result.discounts.len(), 2);
    }

    #[tokio::test]
    async fn remove_others_drops_existing_discounts_in_same_update() {
        let (_repo, gateway, handler, id) = setup(vec![promo("OLD"), promo("OLDER")]).await;

        let result = handler
            .handle(ApplyCouponCommand {
                subscription_id: id,
                coupon_id: gid("WELCOME"),
                remove_others: true,
            })
            .await
            .unwrap();

        assert_eq!(result.removed_discounts, vec![gid("OLD"), gid("OLDER")]);
        assert_eq!(gateway.call_count("update"), 1);
        assert_eq!(result.discounts.len(), 1);
    }

    #[tokio::test]
    async fn coupon_on_ended_subscription_is_invalid_state() {
        let repo = Arc::new(InMemorySubscriptionRepository::new());
        let gateway = MockSubscriptionGateway::new();
        let mut sub = subscription("sub_1", "monthly-10");
        sub.mark_cancelled_at(Timestamp::now().minus_days(1));
        repo.save(&sub).await.unwrap();
        let handler = ApplyCouponHandler::new(repo.clone(), Arc::new(gateway.clone()));

        let err = handler
            .handle(ApplyCouponCommand {
                subscription_id: sub.id,
                coupon_id: gid("WELCOME"),
                remove_others: false,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, BillingError::InvalidState(_)));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn vendor_failure_is_reported() {
        let (repo, gateway, handler, id) = setup(vec![]).await;
        gateway.fail_method("update", "Coupon expired");

        let err = handler
            .handle(ApplyCouponCommand {
                subscription_id: id,
                coupon_id: gid("WELCOME"),
                remove_others: false,
            })
            .await
            .unwrap_err();

        assert_eq!(err, BillingError::vendor_operation_failed("Coupon expired"));
        assert_eq!(repo.find_by_id(&id).await.unwrap().unwrap().version, 1);
    }
}
