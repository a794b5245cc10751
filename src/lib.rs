//! Subscription Billing - payment gateway subscription lifecycle
//!
//! Keeps a local mirror of gateway subscriptions in sync: trials, grace
//! periods, plan swaps with cross-frequency proration, coupons, add-ons and
//! cancellation, plus the webhook endpoint that applies gateway-side
//! cancellations.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod observability;
pub mod ports;
