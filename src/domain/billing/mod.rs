//! Billing domain - subscription lifecycle against a payment gateway.
//!
//! # Module Structure
//!
//! - `subscription` - Subscription aggregate with derived state
//! - `state` - SubscriptionState classification
//! - `plan` - Gateway plan metadata and billing frequency
//! - `discount` - Gateway discounts and discount instructions
//! - `proration` - Carry-over credit for cross-frequency swaps
//! - `webhook_kind` - Gateway notification kinds
//! - `errors` - BillingError taxonomy

mod discount;
mod errors;
mod plan;
pub mod proration;
mod state;
mod subscription;
mod webhook_kind;

pub use discount::{Discount, DiscountInstruction, PLAN_CREDIT_DISCOUNT_ID};
pub use errors::BillingError;
pub use plan::{BillingFrequency, Plan};
pub use proration::CarryOverCredit;
pub use state::SubscriptionState;
pub use subscription::Subscription;
pub use webhook_kind::WebhookKind;
