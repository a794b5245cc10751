//! Application layer - Commands and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;

pub use handlers::subscription::{
    AddOnCommand, AddOnResult, ApplyCouponCommand, ApplyCouponHandler, ApplyCouponResult,
    CancelMode, CancelSubscriptionCommand, CancelSubscriptionHandler, CancelSubscriptionResult,
    ManageAddOnHandler, MarkAsCancelledCommand, MarkAsCancelledHandler,
    ResumeSubscriptionCommand, ResumeSubscriptionHandler, ResumeSubscriptionResult,
    SwapPlanCommand, SwapPlanHandler, SwapPlanOutcome, SwapPlanResult,
};
pub use handlers::webhook::{
    AcknowledgeWebhookHandler, CancelOnNotificationHandler, DropReason,
    HandleGatewayWebhookCommand, HandleGatewayWebhookHandler, WebhookHandler, WebhookOutcome,
    WebhookRegistry,
};
