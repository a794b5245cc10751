//! Mock plan catalog.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::domain::billing::Plan;
use crate::domain::foundation::{DomainError, GatewayId};
use crate::ports::PlanCatalog;

/// Plan catalog backed by a fixed set of plans.
#[derive(Default, Clone)]
pub struct MockPlanCatalog {
    plans: Arc<Mutex<HashMap<GatewayId, Plan>>>,
}

impl MockPlanCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style plan registration.
    pub fn with_plan(self, plan: Plan) -> Self {
        self.add_plan(plan);
        self
    }

    pub fn add_plan(&self, plan: Plan) {
        self.plans
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(plan.id.clone(), plan);
    }
}

#[async_trait]
impl PlanCatalog for MockPlanCatalog {
    async fn find_plan(&self, id: &GatewayId) -> Result<Option<Plan>, DomainError> {
        Ok(self
            .plans
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned())
    }
}
