//! Integration tests for the gateway webhook endpoint.
//!
//! Drives the full axum router with form-encoded deliveries and checks that
//! every delivery is answered with 200 while only matching, verified
//! cancellations touch the subscription store.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use subscription_billing::adapters::http::{webhook_router, WebhookAppState};
use subscription_billing::adapters::{InMemorySubscriptionRepository, MockNotificationParser};
use subscription_billing::domain::billing::Subscription;
use subscription_billing::domain::foundation::{GatewayId, OwnerId, Timestamp};
use subscription_billing::ports::SubscriptionRepository;

const MERCHANT: &str = "acme";

// =============================================================================
// Test Infrastructure
// =============================================================================

struct Harness {
    repository: Arc<InMemorySubscriptionRepository>,
    parser: MockNotificationParser,
    app: Router,
}

impl Harness {
    fn new() -> Self {
        Self::with_parser(MockNotificationParser::new())
    }

    fn with_parser(parser: MockNotificationParser) -> Self {
        let repository = Arc::new(InMemorySubscriptionRepository::new());
        let state = WebhookAppState::new(repository.clone(), Arc::new(parser.clone()), MERCHANT);
        Self {
            repository,
            parser,
            app: webhook_router(state),
        }
    }

    async fn track(&self, gateway_id: &str) -> Subscription {
        let subscription = Subscription::create(
            OwnerId::new("owner-1").unwrap(),
            "default",
            GatewayId::new(gateway_id).unwrap(),
            GatewayId::new("monthly-10").unwrap(),
            None,
        )
        .unwrap();
        self.repository.save(&subscription).await.unwrap();
        subscription
    }

    async fn stored(&self, gateway_id: &str) -> Subscription {
        self.repository
            .find_by_gateway_id(&GatewayId::new(gateway_id).unwrap())
            .await
            .unwrap()
            .unwrap()
    }

    async fn post(&self, body: String) -> (StatusCode, String) {
        let request = Request::builder()
            .method("POST")
            .uri("/webhooks/gateway")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }
}

fn payload(kind: &str, gateway_id: &str, merchant: &str) -> String {
    format!(
        r#"{{"kind":"{}","subscription":{{"id":"{}","merchant_account_id":"{}"}},"timestamp":"2024-04-01T12:00:00Z"}}"#,
        kind, gateway_id, merchant
    )
}

fn form(signature: &str, payload: &str) -> String {
    serde_urlencoded::to_string([("bt_signature", signature), ("bt_payload", payload)]).unwrap()
}

// =============================================================================
// Cancellation deliveries
// =============================================================================

#[tokio::test]
async fn canceled_notification_marks_subscription_cancelled() {
    let harness = Harness::new();
    harness.track("sub_1").await;

    let (status, body) = harness
        .post(form("sig", &payload("subscription_canceled", "sub_1", MERCHANT)))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Webhook Handled");

    let stored = harness.stored("sub_1").await;
    assert!(stored.is_cancelled());
    assert!(!stored.is_on_grace_period());
    assert_eq!(stored.version, 2);
}

#[tokio::test]
async fn expired_notification_ends_grace_period_immediately() {
    let harness = Harness::new();
    let mut subscription = harness.track("sub_1").await;
    subscription.end_at(Timestamp::now().add_days(10), Timestamp::now());
    harness.repository.update(&mut subscription).await.unwrap();

    let (status, body) = harness
        .post(form("sig", &payload("subscription_expired", "sub_1", MERCHANT)))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Webhook Handled");
    assert!(harness.stored("sub_1").await.is_ended());
}

#[tokio::test]
async fn redelivery_of_ended_subscription_is_a_no_op() {
    let harness = Harness::new();
    let mut subscription = harness.track("sub_1").await;
    subscription.mark_cancelled_at(Timestamp::now().minus_days(3));
    harness.repository.update(&mut subscription).await.unwrap();
    let before = harness.stored("sub_1").await;

    let (status, body) = harness
        .post(form("sig", &payload("subscription_canceled", "sub_1", MERCHANT)))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Webhook Handled");
    assert_eq!(harness.stored("sub_1").await, before);
}

#[tokio::test]
async fn untracked_subscription_is_still_handled() {
    let harness = Harness::new();

    let (status, body) = harness
        .post(form("sig", &payload("subscription_canceled", "sub_unknown", MERCHANT)))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Webhook Handled");
    assert!(harness.repository.is_empty());
}

// =============================================================================
// Dropped deliveries
// =============================================================================

#[tokio::test]
async fn foreign_merchant_account_is_ignored() {
    let harness = Harness::new();
    harness.track("sub_1").await;

    let (status, body) = harness
        .post(form("sig", &payload("subscription_canceled", "sub_1", "other-merchant")))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "");
    assert!(!harness.stored("sub_1").await.is_cancelled());
}

#[tokio::test]
async fn failed_verification_is_acknowledged_without_changes() {
    let harness = Harness::with_parser(MockNotificationParser::rejecting());
    harness.track("sub_1").await;

    let (status, body) = harness
        .post(form("sig", &payload("subscription_canceled", "sub_1", MERCHANT)))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "");
    assert_eq!(harness.parser.call_count(), 1);
    assert!(!harness.stored("sub_1").await.is_cancelled());
}

#[tokio::test]
async fn malformed_payload_is_acknowledged() {
    let harness = Harness::new();

    let (status, body) = harness.post(form("sig", "not json")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "");
}

#[tokio::test]
async fn missing_form_fields_never_reach_the_parser() {
    let harness = Harness::new();

    let (status, body) = harness.post("bt_signature=sig".to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "");
    assert_eq!(harness.parser.call_count(), 0);
}

#[tokio::test]
async fn wrong_content_type_is_still_answered_with_ok() {
    let harness = Harness::new();
    let request = Request::builder()
        .method("POST")
        .uri("/webhooks/gateway")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();

    let response = harness.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(harness.parser.call_count(), 0);
}

// =============================================================================
// Unhandled kinds
// =============================================================================

#[tokio::test]
async fn kinds_without_handler_get_empty_ok() {
    let harness = Harness::new();
    harness.track("sub_1").await;

    let (status, body) = harness
        .post(form("sig", &payload("subscription_went_past_due", "sub_1", MERCHANT)))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "");
    assert!(!harness.stored("sub_1").await.is_cancelled());
}
