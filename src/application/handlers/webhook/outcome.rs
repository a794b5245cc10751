//! Outcomes of webhook dispatch.
//!
//! Every outcome is answered with HTTP 200; the variants exist so hosts can
//! observe what happened without the gateway ever seeing a failure.

use std::fmt;

use crate::domain::billing::{BillingError, WebhookKind};
use crate::domain::foundation::SubscriptionId;

/// Body returned for notifications a registered handler processed.
pub const HANDLED_BODY: &str = "Webhook Handled";

/// What the dispatcher did with a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// A registered handler processed the notification.
    Handled {
        /// Local subscription the notification referred to, if tracked.
        subscription_id: Option<SubscriptionId>,
        /// Whether the local record was changed.
        changed: bool,
    },

    /// Verified, but no handler is registered for the kind.
    Acknowledged,

    /// Rejected before reaching a handler.
    Dropped(DropReason),

    /// A handler failed internally.
    Failed { kind: WebhookKind, error: BillingError },
}

impl WebhookOutcome {
    /// Response body for the gateway.
    pub fn response_body(&self) -> &'static str {
        match self {
            WebhookOutcome::Handled { .. } => HANDLED_BODY,
            _ => "",
        }
    }

    pub fn is_handled(&self) -> bool {
        matches!(self, WebhookOutcome::Handled { .. })
    }
}

/// Why a notification never reached a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// Signature or payload did not verify.
    InvalidNotification(String),

    /// Notification carries no subscription to check the merchant account on.
    MissingSubscription,

    /// Notification belongs to another merchant account.
    MerchantAccountMismatch { expected: String, received: String },
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::InvalidNotification(message) => {
                write!(f, "invalid notification: {}", message)
            }
            DropReason::MissingSubscription => write!(f, "notification has no subscription"),
            DropReason::MerchantAccountMismatch { expected, received } => write!(
                f,
                "merchant account '{}' does not match '{}'",
                received, expected
            ),
        }
    }
}

impl From<DropReason> for BillingError {
    fn from(reason: DropReason) -> Self {
        match reason {
            DropReason::MerchantAccountMismatch { expected, received } => {
                BillingError::account_mismatch(expected, received)
            }
            other => BillingError::parse(other.to_string()),
        }
    }
}
