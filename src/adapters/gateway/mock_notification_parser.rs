//! Mock notification parser.
//!
//! Accepts any non-empty signature and decodes the payload as a JSON
//! `WebhookNotification`. Useful for local development and HTTP tests where
//! the vendor's signing keys are unavailable.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{NotificationParser, WebhookNotification};

/// JSON-decoding notification parser without signature checks.
#[derive(Default, Clone)]
pub struct MockNotificationParser {
    reject_all: Arc<AtomicBool>,
    calls: Arc<AtomicUsize>,
}

impl MockNotificationParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// A parser that fails every verification.
    pub fn rejecting() -> Self {
        let parser = Self::new();
        parser.reject_all.store(true, Ordering::SeqCst);
        parser
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn invalid(message: impl Into<String>) -> DomainError {
        DomainError::new(ErrorCode::InvalidWebhook, message)
    }
}

#[async_trait]
impl NotificationParser for MockNotificationParser {
    async fn parse(
        &self,
        signature: &str,
        payload: &str,
    ) -> Result<WebhookNotification, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.reject_all.load(Ordering::SeqCst) {
            return Err(Self::invalid("signature verification failed"));
        }
        if signature.trim().is_empty() {
            return Err(Self::invalid("missing signature"));
        }

        serde_json::from_str(payload)
            .map_err(|e| Self::invalid(format!("malformed payload: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::WebhookKind;

    const PAYLOAD: &str = r#"{"kind":"subscription_expired","subscription":{"id":"sub_1","merchant_account_id":"acme"},"timestamp":"2024-04-01T00:00:00Z"}"#;

    #[tokio::test]
    async fn decodes_json_payload() {
        let parser = MockNotificationParser::new();
        let notification = parser.parse("sig", PAYLOAD).await.unwrap();
        assert_eq!(notification.kind, WebhookKind::SubscriptionExpired);
        assert_eq!(parser.call_count(), 1);
    }

    #[tokio::test]
    async fn rejects_empty_signature_and_bad_json() {
        let parser = MockNotificationParser::new();
        assert!(parser.parse("", PAYLOAD).await.is_err());

        let err = parser.parse("sig", "not json").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidWebhook);
    }

    #[tokio::test]
    async fn rejecting_parser_fails_valid_payloads() {
        let parser = MockNotificationParser::rejecting();
        assert!(parser.parse("sig", PAYLOAD).await.is_err());
    }
}
