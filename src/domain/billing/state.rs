//! Derived subscription state.
//!
//! There is no stored status column. The state is always computed from
//! `trial_ends_at` / `ends_at` and the current time, so it cannot drift.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a subscription at a given instant.
///
/// Exactly one variant applies at any time. Precedence when fields overlap:
/// `Ended` > `OnGracePeriod` > `OnTrial` > `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionState {
    /// Not scheduled for cancellation and past any trial.
    Active,

    /// Trial has not yet ended; nothing billed.
    OnTrial,

    /// Cancelled, but the already-paid period has not ended.
    OnGracePeriod,

    /// Cancelled and the grace period (if any) is over.
    Ended,
}

impl SubscriptionState {
    /// Returns true if the owner may use the subscription.
    pub fn has_access(&self) -> bool {
        !matches!(self, SubscriptionState::Ended)
    }

    /// Returns true once a cancellation has been recorded.
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            SubscriptionState::OnGracePeriod | SubscriptionState::Ended
        )
    }
}

impl fmt::Display for SubscriptionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SubscriptionState::Active => "active",
            SubscriptionState::OnTrial => "on_trial",
            SubscriptionState::OnGracePeriod => "on_grace_period",
            SubscriptionState::Ended => "ended",
        };
        write!(f, "{}", s)
    }
}
