//! Webhook notification parser port.
//!
//! Verifies the vendor's signature over the payload and decodes the
//! notification. Signature cryptography lives entirely behind this port.

use crate::domain::billing::WebhookKind;
use crate::domain::foundation::{DomainError, GatewayId, Timestamp};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Port for verifying and decoding inbound notifications.
#[async_trait]
pub trait NotificationParser: Send + Sync {
    /// Verify `signature` over `payload` and decode it.
    ///
    /// # Errors
    ///
    /// `InvalidWebhook` if the signature does not verify or the payload is
    /// malformed.
    async fn parse(&self, signature: &str, payload: &str)
        -> Result<WebhookNotification, DomainError>;
}

/// A verified gateway notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookNotification {
    pub kind: WebhookKind,

    /// Subscription the notification is about, for subscription kinds.
    pub subscription: Option<NotificationSubscription>,

    /// When the gateway emitted the notification.
    pub timestamp: Timestamp,
}

/// Subscription fields carried by a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSubscription {
    pub id: GatewayId,
    pub merchant_account_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_parser_is_object_safe() {
        fn _accepts_dyn(_parser: &dyn NotificationParser) {}
    }

    #[test]
    fn notification_deserializes_from_json() {
        let json = r#"{
            "kind": "subscription_canceled",
            "subscription": { "id": "sub_abc", "merchant_account_id": "acme" },
            "timestamp": "2024-04-01T12:00:00Z"
        }"#;

        let notification: WebhookNotification = serde_json::from_str(json).unwrap();
        assert_eq!(notification.kind, WebhookKind::SubscriptionCanceled);
        let subscription = notification.subscription.unwrap();
        assert!(subscription.id == "sub_abc");
        assert_eq!(subscription.merchant_account_id, "acme");
    }
}
