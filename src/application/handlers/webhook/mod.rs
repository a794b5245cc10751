//! Gateway webhook handling.
//!
//! - `dispatcher` - verification, merchant check and routing
//! - `registry` - `WebhookKind` → `WebhookHandler` table with a default
//! - `cancellation` - handler for canceled/expired notifications
//! - `outcome` - what happened to a delivery

mod cancellation;
mod dispatcher;
mod outcome;
mod registry;

pub use cancellation::CancelOnNotificationHandler;
pub use dispatcher::{HandleGatewayWebhookCommand, HandleGatewayWebhookHandler};
pub use outcome::{DropReason, WebhookOutcome, HANDLED_BODY};
pub use registry::{AcknowledgeWebhookHandler, WebhookHandler, WebhookRegistry};
