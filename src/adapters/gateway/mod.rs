//! Payment gateway adapters.
//!
//! In-process implementations of the gateway-facing ports
//! (`SubscriptionGateway`, `PlanCatalog`, `NotificationParser`) and of the
//! host's `OwnerBilling` capability. They back the crate's tests and local
//! development; production hosts implement the ports against their vendor SDK.

mod mock_notification_parser;
mod mock_owner_billing;
mod mock_plan_catalog;
mod mock_subscription_gateway;

pub use mock_notification_parser::MockNotificationParser;
pub use mock_owner_billing::MockOwnerBilling;
pub use mock_plan_catalog::MockPlanCatalog;
pub use mock_subscription_gateway::{MethodCall, MockSubscriptionGateway};
