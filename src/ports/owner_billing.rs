//! Owner billing port.
//!
//! The owning entity (a customer, a team, ...) supplies two capabilities the
//! lifecycle manager needs: its tax percentage, and its "new subscription"
//! flow, which creates the subscription at the gateway and persists the
//! local record.

use crate::domain::billing::{DiscountInstruction, Subscription};
use crate::domain::foundation::{DomainError, GatewayId, OwnerId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Port for owner-level billing capabilities.
#[async_trait]
pub trait OwnerBilling: Send + Sync {
    /// Tax percentage applied to plan prices (e.g. `7.25` for 7.25%).
    async fn tax_percentage(&self, owner_id: &OwnerId) -> Result<f64, DomainError>;

    /// Create a gateway subscription and its local record.
    async fn create_subscription(
        &self,
        request: NewSubscription,
    ) -> Result<Subscription, DomainError>;
}

/// Request for the owner's new-subscription flow.
///
/// # Example
///
/// ```ignore
/// let request = NewSubscription::new(owner_id, "default", plan_id)
///     .skip_trial()
///     .with_discount(DiscountInstruction::plan_credit(amount, 2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSubscription {
    pub owner_id: OwnerId,
    pub name: String,
    pub plan_id: GatewayId,
    pub skip_trial: bool,
    pub discounts: Vec<DiscountInstruction>,
}

impl NewSubscription {
    pub fn new(owner_id: OwnerId, name: impl Into<String>, plan_id: GatewayId) -> Self {
        Self {
            owner_id,
            name: name.into(),
            plan_id,
            skip_trial: false,
            discounts: Vec::new(),
        }
    }

    pub fn skip_trial(mut self) -> Self {
        self.skip_trial = true;
        self
    }

    pub fn with_discount(mut self, discount: DiscountInstruction) -> Self {
        self.discounts.push(discount);
        self
    }
}
