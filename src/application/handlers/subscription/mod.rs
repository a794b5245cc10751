//! Subscription lifecycle command handlers.
//!
//! Each handler loads the subscription, issues the gateway calls the
//! transition requires, and persists the local change through the
//! repository's optimistic version check. Local state is only written after
//! the gateway confirms success.

mod apply_coupon;
mod cancel_subscription;
mod manage_add_ons;
mod mark_as_cancelled;
mod resume_subscription;
mod swap_plan;

pub use apply_coupon::{ApplyCouponCommand, ApplyCouponHandler, ApplyCouponResult};
pub use cancel_subscription::{
    CancelMode, CancelSubscriptionCommand, CancelSubscriptionHandler, CancelSubscriptionResult,
};
pub use manage_add_ons::{AddOnCommand, AddOnResult, ManageAddOnHandler};
pub use mark_as_cancelled::{MarkAsCancelledCommand, MarkAsCancelledHandler};
pub use resume_subscription::{
    ResumeSubscriptionCommand, ResumeSubscriptionHandler, ResumeSubscriptionResult,
};
pub use swap_plan::{SwapPlanCommand, SwapPlanHandler, SwapPlanOutcome, SwapPlanResult};

use crate::domain::billing::{BillingError, Subscription};
use crate::domain::foundation::SubscriptionId;
use crate::ports::{GatewayResult, SubscriptionRepository};

/// Load a subscription or fail with `NotFound`.
pub(crate) async fn load_subscription(
    repository: &dyn SubscriptionRepository,
    id: &SubscriptionId,
) -> Result<Subscription, BillingError> {
    repository
        .find_by_id(id)
        .await?
        .ok_or(BillingError::NotFound(*id))
}

/// Turn an unsuccessful vendor result into `VendorOperationFailed`.
pub(crate) fn ensure_success(result: GatewayResult) -> Result<GatewayResult, BillingError> {
    if result.success {
        Ok(result)
    } else {
        Err(BillingError::vendor_operation_failed(result.failure_message()))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::NaiveDate;

    use crate::domain::billing::{Discount, Subscription};
    use crate::domain::foundation::{GatewayId, OwnerId, Timestamp};
    use crate::ports::GatewaySubscription;

    pub fn gid(id: &str) -> GatewayId {
        GatewayId::new(id).unwrap()
    }

    pub fn subscription(gateway_id: &str, plan_id: &str) -> Subscription {
        Subscription::create(
            OwnerId::new("owner-1").unwrap(),
            "default",
            gid(gateway_id),
            gid(plan_id),
            None,
        )
        .unwrap()
    }

    pub fn gateway_subscription(
        gateway_id: &str,
        plan_id: &str,
        billing_period_end_date: NaiveDate,
        discounts: Vec<Discount>,
    ) -> GatewaySubscription {
        GatewaySubscription {
            id: gid(gateway_id),
            plan_id: gid(plan_id),
            current_billing_cycle: 4,
            billing_period_end_date,
            discounts,
            add_ons: vec![],
            merchant_account_id: "acme".to_string(),
        }
    }

    /// A date `days` calendar days after today.
    pub fn days_from_today(days: i64) -> NaiveDate {
        Timestamp::now().add_days(days).date()
    }
}
