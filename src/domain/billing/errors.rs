//! Billing error taxonomy.
//!
//! # Propagation
//!
//! | Error | Lifecycle caller | Webhook path |
//! |-------|------------------|--------------|
//! | ParseError | - | swallowed, 200 |
//! | AccountMismatch | - | swallowed, 200 |
//! | Precondition | surfaced, not retried | - |
//! | InvalidState | surfaced, not retried | - |
//! | PlanSwapFailed | surfaced, local state untouched | - |
//! | VendorOperationFailed | surfaced, local state untouched | - |
//! | NotFound | surfaced | untracked ids are ack'd |
//! | Conflict | surfaced, retry whole operation | logged, 200 |
//! | Gateway / Infrastructure | surfaced, retryable | logged, 200 |

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, SubscriptionId};

/// Errors raised by subscription lifecycle operations and webhook dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BillingError {
    /// Webhook payload could not be verified or parsed.
    #[error("Webhook parse error: {0}")]
    ParseError(String),

    /// Webhook belongs to a different merchant account.
    #[error("Webhook merchant account '{received}' does not match '{expected}'")]
    AccountMismatch { expected: String, received: String },

    /// Operation is not valid for the subscription's current state.
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Business rule rejected the request.
    #[error("Invalid subscription state: {0}")]
    InvalidState(String),

    /// Gateway rejected a plan update.
    #[error("Gateway failed to swap plans: {message}")]
    PlanSwapFailed { message: String },

    /// Gateway reported an unsuccessful mutation.
    #[error("Gateway operation failed: {message}")]
    VendorOperationFailed { message: String },

    /// No local subscription with this id.
    #[error("Subscription not found: {0}")]
    NotFound(SubscriptionId),

    /// Record changed since it was loaded.
    #[error("Concurrent modification: {0}")]
    Conflict(String),

    #[error("Validation failed for '{field}': {message}")]
    ValidationFailed { field: String, message: String },

    /// Gateway client could not complete the call.
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// Persistence or other local infrastructure failed.
    #[error("Infrastructure error: {0}")]
    Infrastructure(String),
}

impl BillingError {
    pub fn parse(message: impl Into<String>) -> Self {
        BillingError::ParseError(message.into())
    }

    pub fn account_mismatch(expected: impl Into<String>, received: impl Into<String>) -> Self {
        BillingError::AccountMismatch {
            expected: expected.into(),
            received: received.into(),
        }
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        BillingError::Precondition(message.into())
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        BillingError::InvalidState(message.into())
    }

    pub fn plan_swap_failed(message: impl Into<String>) -> Self {
        BillingError::PlanSwapFailed {
            message: message.into(),
        }
    }

    pub fn vendor_operation_failed(message: impl Into<String>) -> Self {
        BillingError::VendorOperationFailed {
            message: message.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        BillingError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn gateway(message: impl Into<String>) -> Self {
        BillingError::Gateway(message.into())
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        BillingError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            BillingError::ParseError(_) => ErrorCode::InvalidWebhook,
            BillingError::AccountMismatch { .. } => ErrorCode::MerchantAccountMismatch,
            BillingError::Precondition(_) => ErrorCode::PreconditionFailed,
            BillingError::InvalidState(_) => ErrorCode::InvalidStateTransition,
            BillingError::PlanSwapFailed { .. } => ErrorCode::PlanSwapFailed,
            BillingError::VendorOperationFailed { .. } => ErrorCode::GatewayOperationFailed,
            BillingError::NotFound(_) => ErrorCode::SubscriptionNotFound,
            BillingError::Conflict(_) => ErrorCode::ConcurrencyConflict,
            BillingError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            BillingError::Gateway(_) => ErrorCode::ExternalServiceError,
            BillingError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns true if the caller may retry the whole operation.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BillingError::Conflict(_)
                | BillingError::Gateway(_)
                | BillingError::Infrastructure(_)
                | BillingError::VendorOperationFailed { .. }
        )
    }
}

impl From<DomainError> for BillingError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ConcurrencyConflict => BillingError::Conflict(err.message),
            ErrorCode::ValidationFailed => BillingError::ValidationFailed {
                field: err.details.get("field").cloned().unwrap_or_default(),
                message: err.message,
            },
            ErrorCode::ExternalServiceError | ErrorCode::GatewayOperationFailed => {
                BillingError::Gateway(err.message)
            }
            _ => BillingError::Infrastructure(err.to_string()),
        }
    }
}
