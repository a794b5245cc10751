//! Gateway webhook notification kinds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of an inbound gateway notification.
///
/// Kinds this crate does not model are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WebhookKind {
    SubscriptionCanceled,
    SubscriptionExpired,
    SubscriptionWentActive,
    SubscriptionWentPastDue,
    SubscriptionTrialEnded,
    SubscriptionChargedSuccessfully,
    SubscriptionChargedUnsuccessfully,
    Check,
    Other(String),
}

impl WebhookKind {
    /// Parse the gateway's kind string.
    pub fn parse(kind: &str) -> Self {
        match kind {
            "subscription_canceled" => WebhookKind::SubscriptionCanceled,
            "subscription_expired" => WebhookKind::SubscriptionExpired,
            "subscription_went_active" => WebhookKind::SubscriptionWentActive,
            "subscription_went_past_due" => WebhookKind::SubscriptionWentPastDue,
            "subscription_trial_ended" => WebhookKind::SubscriptionTrialEnded,
            "subscription_charged_successfully" => WebhookKind::SubscriptionChargedSuccessfully,
            "subscription_charged_unsuccessfully" => {
                WebhookKind::SubscriptionChargedUnsuccessfully
            }
            "check" => WebhookKind::Check,
            other => WebhookKind::Other(other.to_string()),
        }
    }

    /// The gateway's kind string.
    pub fn as_str(&self) -> &str {
        match self {
            WebhookKind::SubscriptionCanceled => "subscription_canceled",
            WebhookKind::SubscriptionExpired => "subscription_expired",
            WebhookKind::SubscriptionWentActive => "subscription_went_active",
            WebhookKind::SubscriptionWentPastDue => "subscription_went_past_due",
            WebhookKind::SubscriptionTrialEnded => "subscription_trial_ended",
            WebhookKind::SubscriptionChargedSuccessfully => "subscription_charged_successfully",
            WebhookKind::SubscriptionChargedUnsuccessfully => {
                "subscription_charged_unsuccessfully"
            }
            WebhookKind::Check => "check",
            WebhookKind::Other(kind) => kind,
        }
    }

    /// Conventional handler name, e.g. `handleSubscriptionCanceled`.
    ///
    /// Segments are split on `.` and `_` and title-cased.
    pub fn handler_name(&self) -> String {
        let mut name = String::from("handle");
        for segment in self.as_str().split(['.', '_']) {
            let mut chars = segment.chars();
            if let Some(first) = chars.next() {
                name.extend(first.to_uppercase());
                name.push_str(chars.as_str());
            }
        }
        name
    }
}

impl From<String> for WebhookKind {
    fn from(kind: String) -> Self {
        WebhookKind::parse(&kind)
    }
}

impl From<WebhookKind> for String {
    fn from(kind: WebhookKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for WebhookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
