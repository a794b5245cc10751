//! Application handlers.
//!
//! Command handlers that orchestrate domain operations across ports.

pub mod subscription;
pub mod webhook;
