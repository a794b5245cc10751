//! ManageAddOnHandler - Add, re-quantify or remove gateway add-ons.

use std::sync::Arc;

use crate::domain::billing::BillingError;
use crate::domain::foundation::{GatewayId, SubscriptionId};
use crate::ports::{AddOn, AddOnChange, SubscriptionGateway, SubscriptionRepository, SubscriptionUpdate};

use super::{ensure_success, load_subscription};

/// Add-on mutation for one subscription.
#[derive(Debug, Clone)]
pub enum AddOnCommand {
    Add {
        subscription_id: SubscriptionId,
        add_on_id: GatewayId,
        quantity: u32,
    },
    UpdateQuantity {
        subscription_id: SubscriptionId,
        add_on_id: GatewayId,
        quantity: u32,
    },
    Remove {
        subscription_id: SubscriptionId,
        add_on_id: GatewayId,
    },
}

impl AddOnCommand {
    /// Add a single unit of `add_on_id`.
    pub fn add(subscription_id: SubscriptionId, add_on_id: GatewayId) -> Self {
        AddOnCommand::Add {
            subscription_id,
            add_on_id,
            quantity: 1,
        }
    }

    pub fn add_quantity(subscription_id: SubscriptionId, add_on_id: GatewayId, quantity: u32) -> Self {
        AddOnCommand::Add {
            subscription_id,
            add_on_id,
            quantity,
        }
    }

    pub fn update_quantity(
        subscription_id: SubscriptionId,
        add_on_id: GatewayId,
        quantity: u32,
    ) -> Self {
        AddOnCommand::UpdateQuantity {
            subscription_id,
            add_on_id,
            quantity,
        }
    }

    pub fn remove(subscription_id: SubscriptionId, add_on_id: GatewayId) -> Self {
        AddOnCommand::Remove {
            subscription_id,
            add_on_id,
        }
    }

    fn subscription_id(&self) -> &SubscriptionId {
        match self {
            AddOnCommand::Add { subscription_id, .. }
            | AddOnCommand::UpdateQuantity { subscription_id, .. }
            | AddOnCommand::Remove { subscription_id, .. } => subscription_id,
        }
    }

    fn into_change(self) -> Result<AddOnChange, BillingError> {
        match self {
            AddOnCommand::Add {
                add_on_id, quantity, ..
            } => {
                ensure_positive(quantity)?;
                Ok(AddOnChange::Add {
                    inherited_from_id: add_on_id,
                    quantity,
                })
            }
            AddOnCommand::UpdateQuantity {
                add_on_id, quantity, ..
            } => {
                ensure_positive(quantity)?;
                Ok(AddOnChange::Update {
                    existing_id: add_on_id,
                    quantity,
                })
            }
            AddOnCommand::Remove { add_on_id, .. } => Ok(AddOnChange::Remove {
                existing_id: add_on_id,
            }),
        }
    }
}

fn ensure_positive(quantity: u32) -> Result<(), BillingError> {
    if quantity == 0 {
        return Err(BillingError::validation(
            "quantity",
            "Add-on quantity must be at least 1",
        ));
    }
    Ok(())
}

/// Acknowledgement of an add-on mutation.
#[derive(Debug, Clone)]
pub struct AddOnResult {
    pub subscription_id: SubscriptionId,
    pub change: AddOnChange,

    /// Add-ons reported by the gateway after the update, when returned.
    pub add_ons: Vec<AddOn>,
}

/// Handler for add-on mutations. Local state is never mutated.
pub struct ManageAddOnHandler {
    repository: Arc<dyn SubscriptionRepository>,
    gateway: Arc<dyn SubscriptionGateway>,
}

impl ManageAddOnHandler {
    pub fn new(
        repository: Arc<dyn SubscriptionRepository>,
        gateway: Arc<dyn SubscriptionGateway>,
    ) -> Self {
        Self {
            repository,
            gateway,
        }
    }

    pub async fn handle(&self, cmd: AddOnCommand) -> Result<AddOnResult, BillingError> {
        let subscription_id = *cmd.subscription_id();
        let change = cmd.into_change()?;
        let subscription = load_subscription(self.repository.as_ref(), &subscription_id).await?;

        let update = SubscriptionUpdate::new().add_on(change.clone());
        let result = self
            .gateway
            .update(&subscription.gateway_subscription_id, update)
            .await?;
        let result = ensure_success(result)?;

        tracing::info!(
            subscription_id = %subscription.id,
            change = ?change,
            "Add-on updated"
        );

        Ok(AddOnResult {
            subscription_id,
            change,
            add_ons: result.subscription.map(|s| s.add_ons).unwrap_or_default(),
        })
    }
}
