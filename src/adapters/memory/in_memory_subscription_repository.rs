//! In-memory subscription repository.
//!
//! This adapter provides an in-memory implementation of the
//! `SubscriptionRepository` port for development, tests and single-process
//! deployments. It enforces the same optimistic-locking rule as the
//! PostgreSQL adapter.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::billing::Subscription;
use crate::domain::foundation::{
    DomainError, ErrorCode, GatewayId, OwnerId, SubscriptionId, Timestamp,
};
use crate::ports::SubscriptionRepository;

/// In-memory implementation of the SubscriptionRepository port.
///
/// Thread-safe via internal `Mutex`. Does not persist data across restarts.
#[derive(Default)]
pub struct InMemorySubscriptionRepository {
    records: Mutex<HashMap<SubscriptionId, Subscription>>,
}

impl InMemorySubscriptionRepository {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every stored subscription.
    pub fn all(&self) -> Vec<Subscription> {
        self.records().values().cloned().collect()
    }

    /// Returns the number of stored subscriptions.
    pub fn len(&self) -> usize {
        self.records().len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    fn records(&self) -> MutexGuard<'_, HashMap<SubscriptionId, Subscription>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn save(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let mut records = self.records();

        if records.contains_key(&subscription.id) {
            return Err(DomainError::validation(
                "id",
                format!("Subscription {} already exists", subscription.id),
            ));
        }
        if records
            .values()
            .any(|s| s.gateway_subscription_id == subscription.gateway_subscription_id)
        {
            return Err(DomainError::validation(
                "gateway_subscription_id",
                format!(
                    "Gateway subscription {} is already tracked",
                    subscription.gateway_subscription_id
                ),
            ));
        }

        let mut stored = subscription.clone();
        stored.prorate = true;
        records.insert(stored.id, stored);
        Ok(())
    }

    async fn update(&self, subscription: &mut Subscription) -> Result<(), DomainError> {
        let mut records = self.records();

        let stored = records.get_mut(&subscription.id).ok_or_else(|| {
            DomainError::new(
                ErrorCode::SubscriptionNotFound,
                format!("Subscription not found: {}", subscription.id),
            )
        })?;

        if stored.version != subscription.version {
            return Err(DomainError::conflict(format!(
                "Subscription {} was modified (expected version {}, found {})",
                subscription.id, subscription.version, stored.version
            )));
        }

        subscription.version += 1;
        subscription.updated_at = Timestamp::now();

        let mut next = subscription.clone();
        next.prorate = true;
        *stored = next;
        Ok(())
    }

    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, DomainError> {
        Ok(self.records().get(id).cloned())
    }

    async fn find_by_gateway_id(
        &self,
        gateway_id: &GatewayId,
    ) -> Result<Option<Subscription>, DomainError> {
        Ok(self
            .records()
            .values()
            .find(|s| &s.gateway_subscription_id == gateway_id)
            .cloned())
    }

    async fn find_by_owner(&self, owner_id: &OwnerId) -> Result<Vec<Subscription>, DomainError> {
        let mut owned: Vec<Subscription> = self
            .records()
            .values()
            .filter(|s| &s.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by_key(|s| s.created_at);
        Ok(owned)
    }
}
