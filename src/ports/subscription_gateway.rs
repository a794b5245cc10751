//! Subscription gateway port.
//!
//! Defines the contract for the payment vendor's subscription API. The
//! gateway is the source of truth for billing-cycle facts (current cycle,
//! period end date, discounts, add-ons); they are fetched on demand and
//! never mirrored locally.
//!
//! # Design
//!
//! - **Transport vs. outcome**: `Err(DomainError)` means the call itself
//!   failed; a completed call that the vendor rejected comes back as
//!   `GatewayResult { success: false, .. }`
//! - **Retries belong to the client**: implementations own backoff policy

use crate::domain::billing::{Discount, DiscountInstruction};
use crate::domain::foundation::{DomainError, GatewayId, Money};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Port for the vendor's subscription endpoints.
#[async_trait]
pub trait SubscriptionGateway: Send + Sync {
    /// Fetch the vendor's current view of a subscription.
    async fn find(&self, id: &GatewayId) -> Result<GatewaySubscription, DomainError>;

    /// Apply a partial update.
    async fn update(
        &self,
        id: &GatewayId,
        update: SubscriptionUpdate,
    ) -> Result<GatewayResult, DomainError>;

    /// Cancel immediately at the vendor.
    async fn cancel(&self, id: &GatewayId) -> Result<GatewayResult, DomainError>;
}

/// Vendor-side subscription details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewaySubscription {
    pub id: GatewayId,
    pub plan_id: GatewayId,

    /// Number of the billing cycle currently running (1-based).
    pub current_billing_cycle: u32,

    /// Last day of the current paid period.
    pub billing_period_end_date: NaiveDate,

    pub discounts: Vec<Discount>,
    pub add_ons: Vec<AddOn>,
    pub merchant_account_id: String,
}

/// Add-on currently attached to a subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddOn {
    pub id: GatewayId,
    pub quantity: u32,
}

/// One add-on mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AddOnChange {
    /// Attach a new add-on from a vendor template.
    Add {
        inherited_from_id: GatewayId,
        quantity: u32,
    },

    /// Change the quantity of an attached add-on.
    Update { existing_id: GatewayId, quantity: u32 },

    /// Detach an add-on.
    Remove { existing_id: GatewayId },
}

/// Partial update sent to the vendor. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionUpdate {
    pub plan_id: Option<GatewayId>,

    /// Price per cycle, already including owner tax.
    pub price: Option<Money>,

    pub never_expires: Option<bool>,

    /// Cap on billing cycles. `Some(None)` removes an existing cap.
    pub number_of_billing_cycles: Option<Option<u32>>,

    pub prorate_charges: Option<bool>,

    pub add_discounts: Vec<DiscountInstruction>,
    pub remove_discounts: Vec<GatewayId>,
    pub add_ons: Vec<AddOnChange>,
}

impl SubscriptionUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to `plan_id` at `price`.
    pub fn plan(mut self, plan_id: GatewayId, price: Money) -> Self {
        self.plan_id = Some(plan_id);
        self.price = Some(price);
        self
    }

    /// Run indefinitely, removing any billing-cycle cap.
    pub fn never_expires(mut self) -> Self {
        self.never_expires = Some(true);
        self.number_of_billing_cycles = Some(None);
        self
    }

    /// Stop billing after `cycles` cycles.
    pub fn cap_billing_cycles(mut self, cycles: u32) -> Self {
        self.number_of_billing_cycles = Some(Some(cycles));
        self
    }

    pub fn prorate_charges(mut self, prorate: bool) -> Self {
        self.prorate_charges = Some(prorate);
        self
    }

    pub fn add_discount(mut self, discount: DiscountInstruction) -> Self {
        self.add_discounts.push(discount);
        self
    }

    pub fn remove_discounts(mut self, ids: impl IntoIterator<Item = GatewayId>) -> Self {
        self.remove_discounts.extend(ids);
        self
    }

    pub fn add_on(mut self, change: AddOnChange) -> Self {
        self.add_ons.push(change);
        self
    }
}

/// Outcome of a completed vendor mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayResult {
    pub success: bool,

    /// Vendor's explanation when `success` is false.
    pub message: Option<String>,

    /// Updated subscription when `success` is true.
    pub subscription: Option<GatewaySubscription>,
}

impl GatewayResult {
    pub fn succeeded(subscription: Option<GatewaySubscription>) -> Self {
        Self {
            success: true,
            message: None,
            subscription,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            subscription: None,
        }
    }

    /// Vendor message, or a generic one when none was given.
    pub fn failure_message(&self) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| "gateway reported failure".to_string())
    }
}
