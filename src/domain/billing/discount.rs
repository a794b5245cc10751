//! Gateway discounts and discount instructions.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{GatewayId, Money};

/// Reserved discount template used to carry unused value across a
/// cross-frequency plan swap.
pub const PLAN_CREDIT_DISCOUNT_ID: &str = "plan-credit";

/// A discount currently attached to a gateway subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discount {
    pub id: GatewayId,

    /// Amount taken off each billing cycle.
    pub amount: Money,

    /// Remaining cycles the discount applies to.
    pub number_of_billing_cycles: u32,
}

impl Discount {
    /// True for discounts created from the reserved plan-credit template.
    pub fn is_plan_credit(&self) -> bool {
        self.id == PLAN_CREDIT_DISCOUNT_ID
    }

    /// Total value still to be granted by this discount.
    pub fn remaining_value(&self) -> Money {
        self.amount.times(self.number_of_billing_cycles)
    }
}

/// Request to attach a discount inherited from a gateway template.
///
/// `amount` and `number_of_billing_cycles` override the template when set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountInstruction {
    pub inherited_from_id: GatewayId,
    pub amount: Option<Money>,
    pub number_of_billing_cycles: Option<u32>,
}

impl DiscountInstruction {
    /// Attach a coupon with its template defaults.
    pub fn coupon(coupon_id: GatewayId) -> Self {
        Self {
            inherited_from_id: coupon_id,
            amount: None,
            number_of_billing_cycles: None,
        }
    }

    /// Attach a plan-credit discount with explicit amount and cycles.
    pub fn plan_credit(amount: Money, number_of_billing_cycles: u32) -> Self {
        Self {
            inherited_from_id: GatewayId::from_static(PLAN_CREDIT_DISCOUNT_ID),
            amount: Some(amount),
            number_of_billing_cycles: Some(number_of_billing_cycles),
        }
    }
}
