//! Carry-over credit for cross-frequency plan swaps.
//!
//! Gateways cannot change a subscription's billing frequency in place, so a
//! yearly ↔ monthly swap cancels the current subscription and creates a new
//! one. Unused value is carried over as a `plan-credit` discount.

use serde::{Deserialize, Serialize};

use super::{Discount, DiscountInstruction, Plan};
use crate::domain::foundation::Money;

const DAYS_PER_YEAR: f64 = 365.0;

/// Credit granted to the replacement subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarryOverCredit {
    /// Discount per billing cycle.
    pub amount: Money,

    pub number_of_billing_cycles: u32,
}

impl CarryOverCredit {
    pub fn none() -> Self {
        Self {
            amount: Money::ZERO,
            number_of_billing_cycles: 0,
        }
    }

    /// A discount instruction, or `None` when there is nothing to carry over.
    pub fn into_instruction(self) -> Option<DiscountInstruction> {
        if self.amount.is_positive() && self.number_of_billing_cycles > 0 {
            Some(DiscountInstruction::plan_credit(
                self.amount,
                self.number_of_billing_cycles,
            ))
        } else {
            None
        }
    }
}

/// True only for a yearly → monthly swap.
pub fn is_switching_to_monthly(current: &Plan, target: &Plan) -> bool {
    current.billing_frequency.is_yearly() && target.billing_frequency.is_monthly()
}

/// Credit for leaving a yearly plan with `days_remaining` left in the period.
///
/// The unused yearly value is paid out as whole months of the target plan.
pub fn credit_for_switch_to_monthly(
    yearly: &Plan,
    monthly: &Plan,
    days_remaining: i64,
) -> CarryOverCredit {
    let monthly_cents = monthly.price.cents();
    if monthly_cents <= 0 || days_remaining <= 0 {
        return CarryOverCredit::none();
    }

    let remaining = yearly.price.cents() as f64 / DAYS_PER_YEAR * days_remaining as f64;
    let cycles = (remaining / monthly_cents as f64).floor();
    if cycles < 1.0 {
        return CarryOverCredit::none();
    }

    CarryOverCredit {
        amount: monthly.price,
        number_of_billing_cycles: cycles.min(f64::from(u32::MAX)) as u32,
    }
}

/// Credit for any other cross-frequency swap: outstanding `plan-credit`
/// discounts are folded into a single cycle.
pub fn credit_for_switch_to_yearly(discounts: &[Discount]) -> CarryOverCredit {
    let amount: Money = discounts
        .iter()
        .filter(|d| d.is_plan_credit())
        .map(Discount::remaining_value)
        .sum();

    CarryOverCredit {
        amount,
        number_of_billing_cycles: 1,
    }
}

/// Chooses the credit rule for a swap from `current` to `target`.
pub fn carry_over_credit(
    current: &Plan,
    target: &Plan,
    discounts: &[Discount],
    days_remaining: i64,
) -> CarryOverCredit {
    if is_switching_to_monthly(current, target) {
        credit_for_switch_to_monthly(current, target, days_remaining)
    } else {
        credit_for_switch_to_yearly(discounts)
    }
}
