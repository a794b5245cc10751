//! Subscription repository port.
//!
//! Defines the contract for persisting and retrieving Subscription aggregates.
//!
//! # Design
//!
//! - **Optimistic locking**: `update` only succeeds when the stored version
//!   equals the aggregate's version, then bumps it
//! - **No deletes**: cancelled subscriptions stay on record
//! - **`prorate` is not persisted**: loaded aggregates always prorate

use crate::domain::billing::Subscription;
use crate::domain::foundation::{DomainError, GatewayId, OwnerId, SubscriptionId};
use async_trait::async_trait;

/// Repository port for Subscription aggregate persistence.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Save a new subscription.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if the id or gateway id is already stored
    /// - `DatabaseError` on persistence failure
    async fn save(&self, subscription: &Subscription) -> Result<(), DomainError>;

    /// Update an existing subscription, incrementing `subscription.version`
    /// on success.
    ///
    /// # Errors
    ///
    /// - `SubscriptionNotFound` if the subscription doesn't exist
    /// - `ConcurrencyConflict` if the stored version differs
    /// - `DatabaseError` on persistence failure
    async fn update(&self, subscription: &mut Subscription) -> Result<(), DomainError>;

    /// Find a subscription by its local id.
    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, DomainError>;

    /// Find a subscription by its gateway id.
    async fn find_by_gateway_id(
        &self,
        gateway_id: &GatewayId,
    ) -> Result<Option<Subscription>, DomainError>;

    /// All subscriptions of an owner, oldest first.
    async fn find_by_owner(&self, owner_id: &OwnerId) -> Result<Vec<Subscription>, DomainError>;
}
