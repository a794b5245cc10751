//! Mock owner billing capability.
//!
//! Records every new-subscription request and, when a repository is
//! attached, persists the created record the way a host's owner flow would.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::billing::Subscription;
use crate::domain::foundation::{DomainError, GatewayId, OwnerId, Timestamp};
use crate::ports::{NewSubscription, OwnerBilling, SubscriptionRepository};

/// Trial length granted when a request does not skip the trial.
const DEFAULT_TRIAL_DAYS: i64 = 14;

/// Mock owner billing.
#[derive(Clone)]
pub struct MockOwnerBilling {
    inner: Arc<Mutex<OwnerState>>,
    repository: Option<Arc<dyn SubscriptionRepository>>,
}

struct OwnerState {
    tax_percent: f64,
    requests: Vec<NewSubscription>,
    next_error: Option<DomainError>,
}

impl MockOwnerBilling {
    /// Owner with no tax.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(OwnerState {
                tax_percent: 0.0,
                requests: Vec::new(),
                next_error: None,
            })),
            repository: None,
        }
    }

    pub fn with_tax_percent(self, tax_percent: f64) -> Self {
        self.state().tax_percent = tax_percent;
        self
    }

    /// Persist created subscriptions into `repository`.
    pub fn with_repository(mut self, repository: Arc<dyn SubscriptionRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Fail the next `create_subscription` call.
    pub fn set_error(&self, error: DomainError) {
        self.state().next_error = Some(error);
    }

    /// All new-subscription requests received, in order.
    pub fn requests(&self) -> Vec<NewSubscription> {
        self.state().requests.clone()
    }

    pub fn last_request(&self) -> Option<NewSubscription> {
        self.state().requests.last().cloned()
    }

    fn state(&self) -> MutexGuard<'_, OwnerState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MockOwnerBilling {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OwnerBilling for MockOwnerBilling {
    async fn tax_percentage(&self, _owner_id: &OwnerId) -> Result<f64, DomainError> {
        Ok(self.state().tax_percent)
    }

    async fn create_subscription(
        &self,
        request: NewSubscription,
    ) -> Result<Subscription, DomainError> {
        let sequence = {
            let mut state = self.state();
            state.requests.push(request.clone());
            if let Some(error) = state.next_error.take() {
                return Err(error);
            }
            state.requests.len()
        };

        let trial_ends_at = if request.skip_trial {
            None
        } else {
            Some(Timestamp::now().add_days(DEFAULT_TRIAL_DAYS))
        };
        let gateway_id = GatewayId::new(format!("sub_mock_{}", sequence))?;
        let subscription = Subscription::create(
            request.owner_id,
            request.name,
            gateway_id,
            request.plan_id,
            trial_ends_at,
        )?;

        if let Some(repository) = &self.repository {
            repository.save(&subscription).await?;
        }

        Ok(subscription)
    }
}
