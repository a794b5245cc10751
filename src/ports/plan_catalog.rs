//! Plan catalog port.
//!
//! Read-only access to plan metadata defined at the gateway. Managing the
//! catalog itself is out of scope.

use crate::domain::billing::Plan;
use crate::domain::foundation::{DomainError, GatewayId};
use async_trait::async_trait;

/// Port for looking up gateway plans.
#[async_trait]
pub trait PlanCatalog: Send + Sync {
    /// Find a plan by its gateway id.
    ///
    /// Returns `None` if the gateway has no such plan.
    async fn find_plan(&self, id: &GatewayId) -> Result<Option<Plan>, DomainError>;
}
