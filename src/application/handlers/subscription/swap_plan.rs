//! SwapPlanHandler - Move a subscription to another plan.
//!
//! # Paths
//!
//! 1. Grace period, same plan: resume instead of swapping.
//! 2. Not active: start a fresh subscription on the target plan.
//! 3. Billing frequency changes (and proration is on): cancel now and
//!    recreate, carrying unused value over as a `plan-credit` discount.
//! 4. Otherwise: update the plan in place at the gateway.

use std::sync::Arc;

use crate::domain::billing::{proration, BillingError, Plan, Subscription};
use crate::domain::foundation::{GatewayId, SubscriptionId, Timestamp};
use crate::ports::{
    NewSubscription, OwnerBilling, PlanCatalog, SubscriptionGateway, SubscriptionRepository,
    SubscriptionUpdate,
};

use super::cancel_subscription::cancel_now;
use super::load_subscription;
use super::resume_subscription::resume;

/// Command to swap a subscription's plan.
#[derive(Debug, Clone)]
pub struct SwapPlanCommand {
    pub subscription_id: SubscriptionId,
    pub plan_id: GatewayId,

    /// Prorate charges. `None` uses the subscription's own preference.
    pub prorate: Option<bool>,
}

impl SwapPlanCommand {
    pub fn new(subscription_id: SubscriptionId, plan_id: GatewayId) -> Self {
        Self {
            subscription_id,
            plan_id,
            prorate: None,
        }
    }

    pub fn without_proration(mut self) -> Self {
        self.prorate = Some(false);
        self
    }
}

/// Which path the swap took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapPlanOutcome {
    /// Plan updated in place.
    Swapped,

    /// Same plan during grace; the cancellation was undone.
    Resumed,

    /// A new subscription replaced the old one.
    Recreated,
}

/// Result of a successful swap.
#[derive(Debug, Clone)]
pub struct SwapPlanResult {
    /// The subscription now on the target plan. For `Recreated` this is the
    /// new record; the old one has been cancelled or had already ended.
    pub subscription: Subscription,
    pub outcome: SwapPlanOutcome,
}

/// Handler for plan swaps.
pub struct SwapPlanHandler {
    repository: Arc<dyn SubscriptionRepository>,
    gateway: Arc<dyn SubscriptionGateway>,
    plans: Arc<dyn PlanCatalog>,
    owner: Arc<dyn OwnerBilling>,
}

impl SwapPlanHandler {
    pub fn new(
        repository: Arc<dyn SubscriptionRepository>,
        gateway: Arc<dyn SubscriptionGateway>,
        plans: Arc<dyn PlanCatalog>,
        owner: Arc<dyn OwnerBilling>,
    ) -> Self {
        Self {
            repository,
            gateway,
            plans,
            owner,
        }
    }

    pub async fn handle(&self, cmd: SwapPlanCommand) -> Result<SwapPlanResult, BillingError> {
        let now = Timestamp::now();
        let mut subscription =
            load_subscription(self.repository.as_ref(), &cmd.subscription_id).await?;
        let prorate = cmd.prorate.unwrap_or(subscription.prorate);

        // 1. Same plan during grace
        if subscription.is_on_grace_period_at(now) && subscription.plan_id == cmd.plan_id {
            resume(
                self.gateway.as_ref(),
                self.repository.as_ref(),
                &mut subscription,
                now,
            )
            .await?;
            return Ok(SwapPlanResult {
                subscription,
                outcome: SwapPlanOutcome::Resumed,
            });
        }

        // 2. Nothing left to swap
        if !subscription.is_active_at(now) {
            let request = NewSubscription::new(
                subscription.owner_id.clone(),
                subscription.name.clone(),
                cmd.plan_id,
            )
            .skip_trial();
            let created = self.owner.create_subscription(request).await?;

            tracing::info!(
                subscription_id = %subscription.id,
                new_subscription_id = %created.id,
                plan_id = %created.plan_id,
                "Ended subscription replaced by a new one"
            );
            return Ok(SwapPlanResult {
                subscription: created,
                outcome: SwapPlanOutcome::Recreated,
            });
        }

        // 3. Frequency change
        let target = self.find_plan(&cmd.plan_id).await?;
        let current = self.find_plan(&subscription.plan_id).await?;

        if target.changes_frequency_from(&current) && prorate {
            let created = self
                .swap_across_frequency(&mut subscription, &current, &target, now)
                .await?;
            return Ok(SwapPlanResult {
                subscription: created,
                outcome: SwapPlanOutcome::Recreated,
            });
        }

        // 4. In-place update
        let tax_percent = self.owner.tax_percentage(&subscription.owner_id).await?;
        let update = SubscriptionUpdate::new()
            .plan(target.id.clone(), target.price_with_tax(tax_percent))
            .never_expires()
            .prorate_charges(prorate);

        let result = self
            .gateway
            .update(&subscription.gateway_subscription_id, update)
            .await?;
        if !result.success {
            tracing::warn!(
                subscription_id = %subscription.id,
                plan_id = %target.id,
                message = %result.failure_message(),
                "Gateway rejected plan swap"
            );
            return Err(BillingError::plan_swap_failed(result.failure_message()));
        }

        subscription.apply_plan(target.id, now);
        self.repository.update(&mut subscription).await?;

        tracing::info!(
            subscription_id = %subscription.id,
            plan_id = %subscription.plan_id,
            prorate,
            "Subscription plan swapped"
        );
        Ok(SwapPlanResult {
            subscription,
            outcome: SwapPlanOutcome::Swapped,
        })
    }

    async fn find_plan(&self, id: &GatewayId) -> Result<Plan, BillingError> {
        self.plans
            .find_plan(id)
            .await?
            .ok_or_else(|| BillingError::validation("plan_id", format!("Unknown plan: {}", id)))
    }

    async fn swap_across_frequency(
        &self,
        subscription: &mut Subscription,
        current: &Plan,
        target: &Plan,
        now: Timestamp,
    ) -> Result<Subscription, BillingError> {
        let remote = self
            .gateway
            .find(&subscription.gateway_subscription_id)
            .await?;
        let days_remaining = now.days_until(remote.billing_period_end_date);
        let credit =
            proration::carry_over_credit(current, target, &remote.discounts, days_remaining);

        cancel_now(
            self.gateway.as_ref(),
            self.repository.as_ref(),
            subscription,
            now,
        )
        .await?;

        let mut request = NewSubscription::new(
            subscription.owner_id.clone(),
            subscription.name.clone(),
            target.id.clone(),
        )
        .skip_trial();
        if let Some(discount) = credit.into_instruction() {
            request = request.with_discount(discount);
        }
        let created = self.owner.create_subscription(request).await?;

        tracing::info!(
            subscription_id = %subscription.id,
            new_subscription_id = %created.id,
            from_frequency = %current.billing_frequency,
            to_frequency = %target.billing_frequency,
            credit_cents = credit.amount.cents(),
            credit_cycles = credit.number_of_billing_cycles,
            "Subscription recreated for billing frequency change"
        );
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::gateway::{MockOwnerBilling, MockPlanCatalog, MockSubscriptionGateway};
    use crate::adapters::memory::InMemorySubscriptionRepository;
    use crate::application::handlers::subscription::test_support::*;
    use crate::domain::billing::{BillingFrequency, Discount, PLAN_CREDIT_DISCOUNT_ID};
    use crate::domain::foundation::Money;

    // ════════════════════════════════════════════════════════════════════════
    // Fixture
    // ════════════════════════════════════════════════════════════════════════

    struct Fixture {
        repo: Arc<InMemorySubscriptionRepository>,
        gateway: MockSubscriptionGateway,
        owner: MockOwnerBilling,
        handler: SwapPlanHandler,
    }

    fn fixture() -> Fixture {
        let repo = Arc::new(InMemorySubscriptionRepository::new());
        let gateway = MockSubscriptionGateway::new();
        let plans = MockPlanCatalog::new()
            .with_plan(Plan::new(gid("monthly-10"), Money::from_cents(1000), BillingFrequency::MONTHLY))
            .with_plan(Plan::new(gid("monthly-20"), Money::from_cents(2000), BillingFrequency::MONTHLY))
            .with_plan(Plan::new(gid("monthly-50"), Money::from_cents(5000), BillingFrequency::MONTHLY))
            .with_plan(Plan::new(gid("yearly-365"), Money::from_cents(36_500), BillingFrequency::YEARLY));
        let owner = MockOwnerBilling::new()
            .with_tax_percent(10.0)
            .with_repository(repo.clone());
        let handler = SwapPlanHandler::new(
            repo.clone(),
            Arc::new(gateway.clone()),
            Arc::new(plans),
            Arc::new(owner.clone()),
        );
        Fixture {
            repo,
            gateway,
            owner,
            handler,
        }
    }

    async fn active(f: &Fixture, plan_id: &str, period_end_in_days: i64, discounts: Vec<Discount>) -> Subscription {
        let sub = subscription("sub_1", plan_id);
        f.repo.save(&sub).await.unwrap();
        f.gateway.add_subscription(gateway_subscription(
            "sub_1",
            plan_id,
            days_from_today(period_end_in_days),
            discounts,
        ));
        sub
    }

    // ════════════════════════════════════════════════════════════════════════
    // In-place swap
    // ════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn same_frequency_swap_updates_in_place_with_tax() {
        let f = fixture();
        let sub = active(&f, "monthly-10", 20, vec![]).await;

        let result = f
            .handler
            .handle(SwapPlanCommand::new(sub.id, gid("monthly-20")))
            .await
            .unwrap();

        assert_eq!(result.outcome, SwapPlanOutcome::Swapped);
        assert!(result.subscription.plan_id == "monthly-20");

        let update = f.gateway.last_update().unwrap();
        assert_eq!(update.price, Some(Money::from_cents(2200)));
        assert_eq!(update.never_expires, Some(true));
        assert_eq!(update.number_of_billing_cycles, Some(None));
        assert_eq!(update.prorate_charges, Some(true));
    }

    #[tokio::test]
    async fn explicit_no_proration_is_forwarded() {
        let f = fixture();
        let sub = active(&f, "monthly-10", 20, vec![]).await;

        f.handler
            .handle(SwapPlanCommand::new(sub.id, gid("monthly-20")).without_proration())
            .await
            .unwrap();

        assert_eq!(f.gateway.last_update().unwrap().prorate_charges, Some(false));
    }

    #[tokio::test]
    async fn gateway_rejection_is_plan_swap_failed() {
        let f = fixture();
        let sub = active(&f, "monthly-10", 20, vec![]).await;
        f.gateway.fail_method("update", "Plan is inactive");

        let err = f
            .handler
            .handle(SwapPlanCommand::new(sub.id, gid("monthly-20")))
            .await
            .unwrap_err();

        assert_eq!(err, BillingError::plan_swap_failed("Plan is inactive"));
        let stored = f.repo.find_by_id(&sub.id).await.unwrap().unwrap();
        assert!(stored.plan_id == "monthly-10");
        assert_eq!(stored.version, 1);
    }

    #[tokio::test]
    async fn unknown_target_plan_is_rejected() {
        let f = fixture();
        let sub = active(&f, "monthly-10", 20, vec![]).await;

        let err = f
            .handler
            .handle(SwapPlanCommand::new(sub.id, gid("platinum")))
            .await
            .unwrap_err();

        assert!(matches!(err, BillingError::ValidationFailed { .. }));
        assert!(!f.gateway.was_called("update"));
    }

    // ════════════════════════════════════════════════════════════════════════
    // Grace and ended subscriptions
    // ════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn same_plan_in_grace_resumes() {
        let f = fixture();
        let mut sub = subscription("sub_1", "monthly-10");
        sub.end_at(Timestamp::now().add_days(5), Timestamp::now());
        f.repo.save(&sub).await.unwrap();
        f.gateway.add_subscription(gateway_subscription("sub_1", "monthly-10", days_from_today(5), vec![]));

        let result = f
            .handler
            .handle(SwapPlanCommand::new(sub.id, gid("monthly-10")))
            .await
            .unwrap();

        assert_eq!(result.outcome, SwapPlanOutcome::Resumed);
        assert!(result.subscription.ends_at.is_none());
        let update = f.gateway.last_update().unwrap();
        assert!(update.plan_id.is_none());
        assert_eq!(update.never_expires, Some(true));
    }

    #[tokio::test]
    async fn ended_subscription_starts_fresh_without_trial() {
        let f = fixture();
        let mut sub = subscription("sub_1", "monthly-10");
        sub.mark_cancelled_at(Timestamp::now().minus_days(3));
        f.repo.save(&sub).await.unwrap();

        let result = f
            .handler
            .handle(SwapPlanCommand::new(sub.id, gid("monthly-20")))
            .await
            .unwrap();

        assert_eq!(result.outcome, SwapPlanOutcome::Recreated);
        assert_ne!(result.subscription.id, sub.id);
        let request = f.owner.last_request().unwrap();
        assert!(request.skip_trial);
        assert_eq!(request.name, "default");
        assert!(request.discounts.is_empty());
        assert!(f.gateway.calls().is_empty());
    }

    // ════════════════════════════════════════════════════════════════════════
    // Cross-frequency swap
    // ════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn yearly_to_monthly_carries_remaining_value() {
        let f = fixture();
        let sub = active(&f, "yearly-365", 100, vec![]).await;

        let result = f
            .handler
            .handle(SwapPlanCommand::new(sub.id, gid("monthly-50")))
            .await
            .unwrap();

        assert_eq!(result.outcome, SwapPlanOutcome::Recreated);
        assert!(f.gateway.was_called("cancel"));

        let request = f.owner.last_request().unwrap();
        assert!(request.skip_trial);
        assert_eq!(request.discounts.len(), 1);
        let discount = &request.discounts[0];
        assert!(discount.inherited_from_id == PLAN_CREDIT_DISCOUNT_ID);
        assert_eq!(discount.amount, Some(Money::from_cents(5000)));
        assert_eq!(discount.number_of_billing_cycles, Some(2));

        let old = f.repo.find_by_id(&sub.id).await.unwrap().unwrap();
        assert!(old.ends_at.unwrap() <= Timestamp::now());
    }

    #[tokio::test]
    async fn monthly_to_yearly_folds_plan_credits() {
        let f = fixture();
        let discounts = vec![
            Discount {
                id: gid(PLAN_CREDIT_DISCOUNT_ID),
                amount: Money::from_cents(5000),
                number_of_billing_cycles: 2,
            },
            Discount {
                id: gid("SUMMER10"),
                amount: Money::from_cents(100),
                number_of_billing_cycles: 6,
            },
        ];
        let sub = active(&f, "monthly-50", 10, discounts).await;

        f.handler
            .handle(SwapPlanCommand::new(sub.id, gid("yearly-365")))
            .await
            .unwrap();

        let request = f.owner.last_request().unwrap();
        let discount = &request.discounts[0];
        assert_eq!(discount.amount, Some(Money::from_cents(10_000)));
        assert_eq!(discount.number_of_billing_cycles, Some(1));
    }

    #[tokio::test]
    async fn frequency_change_without_proration_updates_in_place() {
        let f = fixture();
        let sub = active(&f, "monthly-50", 10, vec![]).await;

        let result = f
            .handler
            .handle(SwapPlanCommand::new(sub.id, gid("yearly-365")).without_proration())
            .await
            .unwrap();

        assert_eq!(result.outcome, SwapPlanOutcome::Swapped);
        assert!(!f.gateway.was_called("cancel"));
        assert!(f.owner.requests().is_empty());
    }
}
