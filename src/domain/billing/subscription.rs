//! Subscription aggregate entity.
//!
//! A Subscription is the local mirror of one gateway subscription held by an
//! owner under a named slot (`"default"`, `"main"`, ...).
//!
//! # Design Decisions
//!
//! - **Computed status**: no status column; the state is derived from
//!   `trial_ends_at` / `ends_at` against an explicit `now`
//! - **Gateway owns the cycle**: billing period, discounts and add-ons are
//!   fetched from the gateway on demand and never stored here
//! - **Never deleted**: cancellation only sets `ends_at`
//! - **Optimistic locking**: `version` is checked and bumped by repositories

use crate::domain::foundation::{GatewayId, OwnerId, SubscriptionId, Timestamp, ValidationError};
use serde::{Deserialize, Serialize};

use super::{BillingError, SubscriptionState};

fn default_prorate() -> bool {
    true
}

/// Subscription aggregate.
///
/// # Invariants
///
/// - `ends_at == None` means no cancellation is scheduled
/// - `ends_at <= now` means fully cancelled, `ends_at > now` means grace period
/// - `prorate` is a handle preference only and always `true` after loading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Local primary key.
    pub id: SubscriptionId,

    /// Entity that owns this subscription.
    pub owner_id: OwnerId,

    /// Slot name on the owner.
    pub name: String,

    /// Subscription id at the payment gateway.
    pub gateway_subscription_id: GatewayId,

    /// Current plan id at the payment gateway.
    pub plan_id: GatewayId,

    /// End of the trial, if the subscription started with one.
    pub trial_ends_at: Option<Timestamp>,

    /// Cancellation instant, if cancelled.
    pub ends_at: Option<Timestamp>,

    /// Whether plan swaps prorate charges.
    #[serde(skip, default = "default_prorate")]
    pub prorate: bool,

    pub created_at: Timestamp,

    pub updated_at: Timestamp,

    /// Optimistic-lock counter.
    pub version: i32,
}

impl Subscription {
    /// Create a new subscription record for a freshly created gateway subscription.
    pub fn create(
        owner_id: OwnerId,
        name: impl Into<String>,
        gateway_subscription_id: GatewayId,
        plan_id: GatewayId,
        trial_ends_at: Option<Timestamp>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::empty_field("name"));
        }

        let now = Timestamp::now();
        Ok(Self {
            id: SubscriptionId::new(),
            owner_id,
            name,
            gateway_subscription_id,
            plan_id,
            trial_ends_at,
            ends_at: None,
            prorate: true,
            created_at: now,
            updated_at: now,
            version: 1,
        })
    }

    // ════════════════════════════════════════════════════════════════════════
    // State derivation
    // ════════════════════════════════════════════════════════════════════════

    /// A cancellation has been recorded (grace period or fully ended).
    pub fn is_cancelled(&self) -> bool {
        self.ends_at.is_some()
    }

    /// Trial runs until `trial_ends_at`, compared against midnight of `now`.
    pub fn is_on_trial_at(&self, now: Timestamp) -> bool {
        match self.trial_ends_at {
            Some(trial_ends_at) => now.start_of_day().is_before(&trial_ends_at),
            None => false,
        }
    }

    /// Cancelled, but `ends_at` still lies in the future.
    pub fn is_on_grace_period_at(&self, now: Timestamp) -> bool {
        match self.ends_at {
            Some(ends_at) => now.is_before(&ends_at),
            None => false,
        }
    }

    /// Not cancelled, or still within the grace period.
    pub fn is_active_at(&self, now: Timestamp) -> bool {
        self.ends_at.is_none() || self.is_on_grace_period_at(now)
    }

    /// Grants access: active, on trial, or in grace.
    pub fn is_valid_at(&self, now: Timestamp) -> bool {
        self.is_active_at(now) || self.is_on_trial_at(now) || self.is_on_grace_period_at(now)
    }

    /// Cancelled and past the grace period.
    pub fn is_ended_at(&self, now: Timestamp) -> bool {
        self.is_cancelled() && !self.is_on_grace_period_at(now)
    }

    /// Single classification at `now`.
    pub fn state_at(&self, now: Timestamp) -> SubscriptionState {
        if self.is_ended_at(now) {
            SubscriptionState::Ended
        } else if self.is_on_grace_period_at(now) {
            SubscriptionState::OnGracePeriod
        } else if self.is_on_trial_at(now) {
            SubscriptionState::OnTrial
        } else {
            SubscriptionState::Active
        }
    }

    pub fn is_on_trial(&self) -> bool {
        self.is_on_trial_at(Timestamp::now())
    }

    pub fn is_on_grace_period(&self) -> bool {
        self.is_on_grace_period_at(Timestamp::now())
    }

    pub fn is_active(&self) -> bool {
        self.is_active_at(Timestamp::now())
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Timestamp::now())
    }

    pub fn is_ended(&self) -> bool {
        self.is_ended_at(Timestamp::now())
    }

    pub fn state(&self) -> SubscriptionState {
        self.state_at(Timestamp::now())
    }

    // ════════════════════════════════════════════════════════════════════════
    // Transitions
    // ════════════════════════════════════════════════════════════════════════

    /// Mark the subscription as fully cancelled at `now`.
    pub fn mark_cancelled_at(&mut self, now: Timestamp) {
        self.ends_at = Some(now);
        self.updated_at = now;
    }

    /// Schedule the cancellation for `ends_at` (normally the end of the paid period).
    pub fn end_at(&mut self, ends_at: Timestamp, now: Timestamp) {
        self.ends_at = Some(ends_at);
        self.updated_at = now;
    }

    /// Clear a pending cancellation.
    ///
    /// # Errors
    ///
    /// `Precondition` unless the subscription is within its grace period.
    pub fn resume_at(&mut self, now: Timestamp) -> Result<(), BillingError> {
        if !self.is_on_grace_period_at(now) {
            return Err(BillingError::precondition(
                "Unable to resume subscription that is not within grace period",
            ));
        }
        self.ends_at = None;
        self.updated_at = now;
        Ok(())
    }

    /// Record a successful plan update at the gateway.
    pub fn apply_plan(&mut self, plan_id: GatewayId, now: Timestamp) {
        self.plan_id = plan_id;
        self.ends_at = None;
        self.updated_at = now;
    }

    /// Disable proration for subsequent swaps on this handle.
    pub fn no_prorate(&mut self) -> &mut Self {
        self.prorate = false;
        self
    }

    /// Whether a gateway cancellation notification should mark this record.
    ///
    /// Fully ended records are left untouched so repeated deliveries are no-ops.
    pub fn should_cancel_on_notification_at(&self, now: Timestamp) -> bool {
        !self.is_cancelled() || self.is_on_grace_period_at(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn at(y: i32, m: u32, d: u32, h: u32) -> Timestamp {
        Timestamp::from_datetime(Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap())
    }

    fn test_subscription() -> Subscription {
        Subscription::create(
            OwnerId::new("owner-1").unwrap(),
            "default",
            GatewayId::new("sub_abc").unwrap(),
            GatewayId::new("monthly-10").unwrap(),
            None,
        )
        .unwrap()
    }

    // ════════════════════════════════════════════════════════════════════════
    // Creation
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn create_starts_active_and_prorating() {
        let sub = test_subscription();
        assert!(sub.ends_at.is_none());
        assert!(sub.prorate);
        assert_eq!(sub.version, 1);
        assert_eq!(sub.state(), SubscriptionState::Active);
    }

    #[test]
    fn create_rejects_blank_name() {
        let result = Subscription::create(
            OwnerId::new("owner-1").unwrap(),
            "  ",
            GatewayId::new("sub_abc").unwrap(),
            GatewayId::new("monthly-10").unwrap(),
            None,
        );
        assert!(matches!(result, Err(ValidationError::EmptyField { .. })));
    }

    // ════════════════════════════════════════════════════════════════════════
    // State derivation
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn trial_compares_against_start_of_today() {
        let mut sub = test_subscription();
        sub.trial_ends_at = Some(at(2024, 3, 10, 6));

        // Midnight of March 10 is before 06:00, so still on trial all day.
        assert!(sub.is_on_trial_at(at(2024, 3, 10, 23)));
        assert!(!sub.is_on_trial_at(at(2024, 3, 11, 0)));
        assert_eq!(sub.state_at(at(2024, 3, 9, 12)), SubscriptionState::OnTrial);
    }

    #[test]
    fn future_ends_at_is_grace_period() {
        let mut sub = test_subscription();
        sub.ends_at = Some(at(2024, 5, 1, 0));
        let now = at(2024, 4, 20, 12);

        assert!(sub.is_cancelled());
        assert!(sub.is_on_grace_period_at(now));
        assert!(sub.is_active_at(now));
        assert!(sub.is_valid_at(now));
        assert!(!sub.is_ended_at(now));
        assert_eq!(sub.state_at(now), SubscriptionState::OnGracePeriod);
    }

    #[test]
    fn past_ends_at_is_ended() {
        let mut sub = test_subscription();
        sub.ends_at = Some(at(2024, 5, 1, 0));
        let now = at(2024, 5, 1, 0);

        assert!(!sub.is_on_grace_period_at(now));
        assert!(!sub.is_active_at(now));
        assert!(!sub.is_valid_at(now));
        assert!(sub.is_ended_at(now));
        assert_eq!(sub.state_at(now), SubscriptionState::Ended);
    }

    #[test]
    fn grace_takes_precedence_over_trial() {
        let mut sub = test_subscription();
        sub.trial_ends_at = Some(at(2024, 6, 1, 0));
        sub.ends_at = Some(at(2024, 5, 20, 0));

        assert_eq!(
            sub.state_at(at(2024, 5, 10, 0)),
            SubscriptionState::OnGracePeriod
        );
    }

    #[test]
    fn ended_takes_precedence_over_trial() {
        let mut sub = test_subscription();
        sub.trial_ends_at = Some(at(2024, 6, 1, 0));
        sub.ends_at = Some(at(2024, 5, 1, 0));
        let now = at(2024, 5, 10, 0);

        // Still valid through the trial, but classified as ended.
        assert!(sub.is_valid_at(now));
        assert_eq!(sub.state_at(now), SubscriptionState::Ended);
    }

    // ════════════════════════════════════════════════════════════════════════
    // Transitions
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn resume_within_grace_clears_ends_at() {
        let mut sub = test_subscription();
        let now = at(2024, 4, 20, 12);
        sub.end_at(at(2024, 5, 1, 0), now);

        sub.resume_at(now).unwrap();
        assert!(sub.ends_at.is_none());
    }

    #[test]
    fn second_resume_fails_and_leaves_state() {
        let mut sub = test_subscription();
        let now = at(2024, 4, 20, 12);
        sub.end_at(at(2024, 5, 1, 0), now);
        sub.resume_at(now).unwrap();

        let before = sub.clone();
        let result = sub.resume_at(now);
        assert!(matches!(result, Err(BillingError::Precondition(_))));
        assert_eq!(sub, before);
    }

    #[test]
    fn resume_after_grace_fails() {
        let mut sub = test_subscription();
        sub.mark_cancelled_at(at(2024, 4, 1, 0));
        assert!(sub.resume_at(at(2024, 4, 2, 0)).is_err());
        assert!(sub.ends_at.is_some());
    }

    #[test]
    fn mark_cancelled_sets_ends_at_to_now() {
        let mut sub = test_subscription();
        let now = at(2024, 4, 1, 9);
        sub.mark_cancelled_at(now);
        assert_eq!(sub.ends_at, Some(now));
        assert!(sub.is_ended_at(now));
    }

    #[test]
    fn apply_plan_clears_cancellation() {
        let mut sub = test_subscription();
        let now = at(2024, 4, 1, 9);
        sub.end_at(at(2024, 5, 1, 0), now);

        sub.apply_plan(GatewayId::new("monthly-20").unwrap(), now);
        assert!(sub.plan_id == "monthly-20");
        assert!(sub.ends_at.is_none());
    }

    #[test]
    fn no_prorate_only_touches_flag() {
        let mut sub = test_subscription();
        let before = sub.clone();
        sub.no_prorate();
        assert!(!sub.prorate);
        assert_eq!(sub.ends_at, before.ends_at);
        assert_eq!(sub.version, before.version);
    }

    #[test]
    fn prorate_is_not_serialized() {
        let mut sub = test_subscription();
        sub.no_prorate();
        let json = serde_json::to_string(&sub).unwrap();
        assert!(!json.contains("prorate"));

        let loaded: Subscription = serde_json::from_str(&json).unwrap();
        assert!(loaded.prorate);
    }

    #[test]
    fn notification_guard_skips_fully_ended() {
        let mut sub = test_subscription();
        let now = at(2024, 4, 10, 0);
        assert!(sub.should_cancel_on_notification_at(now));

        sub.end_at(at(2024, 5, 1, 0), now);
        assert!(sub.should_cancel_on_notification_at(now));

        sub.mark_cancelled_at(at(2024, 4, 1, 0));
        assert!(!sub.should_cancel_on_notification_at(now));
    }
}
