//! Gateway plan metadata.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{GatewayId, Money, ValidationError};

/// Number of months between gateway billing cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BillingFrequency(u32);

impl BillingFrequency {
    /// Billed every month.
    pub const MONTHLY: Self = Self(1);

    /// Billed every twelve months.
    pub const YEARLY: Self = Self(12);

    /// Creates a frequency, rejecting zero months.
    pub fn try_new(months: u32) -> Result<Self, ValidationError> {
        if months == 0 {
            return Err(ValidationError::out_of_range(
                "billing_frequency",
                1,
                i64::from(u32::MAX),
                0,
            ));
        }
        Ok(Self(months))
    }

    /// Returns the number of months.
    pub fn months(&self) -> u32 {
        self.0
    }

    pub fn is_monthly(&self) -> bool {
        *self == Self::MONTHLY
    }

    pub fn is_yearly(&self) -> bool {
        *self == Self::YEARLY
    }
}

impl fmt::Display for BillingFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            1 => write!(f, "monthly"),
            12 => write!(f, "yearly"),
            n => write!(f, "every {} months", n),
        }
    }
}

/// A plan as defined at the payment gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub id: GatewayId,

    /// Base price per billing cycle, before tax.
    pub price: Money,

    pub billing_frequency: BillingFrequency,
}

impl Plan {
    pub fn new(id: GatewayId, price: Money, billing_frequency: BillingFrequency) -> Self {
        Self {
            id,
            price,
            billing_frequency,
        }
    }

    /// True when moving from `current` to this plan changes the billing frequency.
    ///
    /// Gateways cannot update such subscriptions in place.
    pub fn changes_frequency_from(&self, current: &Plan) -> bool {
        self.billing_frequency != current.billing_frequency
    }

    /// Price charged to an owner with the given tax percentage.
    pub fn price_with_tax(&self, tax_percent: f64) -> Money {
        self.price.with_tax_percent(tax_percent)
    }
}
