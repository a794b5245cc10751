//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Gateway Ports
//!
//! - `SubscriptionGateway` - Vendor subscription API (find, update, cancel)
//! - `PlanCatalog` - Plan metadata lookup
//! - `NotificationParser` - Webhook signature verification and decoding
//!
//! ## Host Ports
//!
//! - `OwnerBilling` - Tax percentage and the owner's new-subscription flow
//! - `SubscriptionRepository` - Subscription persistence with optimistic locking

mod notification_parser;
mod owner_billing;
mod plan_catalog;
mod subscription_gateway;
mod subscription_repository;

pub use notification_parser::{NotificationParser, NotificationSubscription, WebhookNotification};
pub use owner_billing::{NewSubscription, OwnerBilling};
pub use plan_catalog::PlanCatalog;
pub use subscription_gateway::{
    AddOn, AddOnChange, GatewayResult, GatewaySubscription, SubscriptionGateway,
    SubscriptionUpdate,
};
pub use subscription_repository::SubscriptionRepository;
