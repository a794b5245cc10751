//! Mock subscription gateway for testing and local development.
//!
//! Provides a configurable in-process stand-in for the vendor's
//! subscription API. Supports:
//! - Pre-configured gateway subscriptions
//! - Transport error injection and vendor-reported failures
//! - Call tracking, including the exact updates sent

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::billing::Discount;
use crate::domain::foundation::{DomainError, ErrorCode, GatewayId};
use crate::ports::{
    AddOn, AddOnChange, GatewayResult, GatewaySubscription, SubscriptionGateway,
    SubscriptionUpdate,
};

/// Mock subscription gateway.
///
/// # Example
///
/// ```ignore
/// let gateway = MockSubscriptionGateway::new();
/// gateway.add_subscription(gateway_subscription);
///
/// // Vendor rejects the next plan update
/// gateway.fail_method("update", "Plan is inactive");
///
/// assert!(gateway.was_called("find"));
/// ```
#[derive(Default, Clone)]
pub struct MockSubscriptionGateway {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    subscriptions: HashMap<GatewayId, GatewaySubscription>,

    /// Transport errors by method name.
    method_errors: HashMap<String, DomainError>,

    /// Vendor-reported failures (`success == false`) by method name.
    method_failures: HashMap<String, String>,

    call_log: Vec<MethodCall>,
    updates: Vec<(GatewayId, SubscriptionUpdate)>,
}

/// Recorded method call for assertions.
#[derive(Debug, Clone)]
pub struct MethodCall {
    pub method: String,
    pub args: Vec<String>,
}

impl MockSubscriptionGateway {
    pub fn new() -> Self {
        Self::default()
    }

    // ════════════════════════════════════════════════════════════════════════
    // Configuration
    // ════════════════════════════════════════════════════════════════════════

    /// Add a subscription to the "vendor".
    pub fn add_subscription(&self, subscription: GatewaySubscription) {
        self.state()
            .subscriptions
            .insert(subscription.id.clone(), subscription);
    }

    /// Current vendor view of a subscription.
    pub fn subscription(&self, id: &GatewayId) -> Option<GatewaySubscription> {
        self.state().subscriptions.get(id).cloned()
    }

    /// Make `method` fail at the transport level.
    pub fn set_method_error(&self, method: &str, error: DomainError) {
        self.state()
            .method_errors
            .insert(method.to_string(), error);
    }

    /// Make `method` complete with `success == false`.
    pub fn fail_method(&self, method: &str, message: &str) {
        self.state()
            .method_failures
            .insert(method.to_string(), message.to_string());
    }

    pub fn clear_errors(&self) {
        let mut state = self.state();
        state.method_errors.clear();
        state.method_failures.clear();
    }

    // ════════════════════════════════════════════════════════════════════════
    // Call Tracking
    // ════════════════════════════════════════════════════════════════════════

    pub fn calls(&self) -> Vec<MethodCall> {
        self.state().call_log.clone()
    }

    pub fn was_called(&self, method: &str) -> bool {
        self.state().call_log.iter().any(|c| c.method == method)
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.state()
            .call_log
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    /// Every update sent, in order.
    pub fn updates(&self) -> Vec<(GatewayId, SubscriptionUpdate)> {
        self.state().updates.clone()
    }

    /// The most recent update sent.
    pub fn last_update(&self) -> Option<SubscriptionUpdate> {
        self.state().updates.last().map(|(_, u)| u.clone())
    }

    // ════════════════════════════════════════════════════════════════════════
    // Internal Helpers
    // ════════════════════════════════════════════════════════════════════════

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record_call(&self, method: &str, args: Vec<String>) {
        self.state().call_log.push(MethodCall {
            method: method.to_string(),
            args,
        });
    }

    /// Transport error or vendor failure configured for `method`.
    fn check_method(&self, method: &str) -> Result<Option<GatewayResult>, DomainError> {
        let state = self.state();
        if let Some(error) = state.method_errors.get(method) {
            return Err(error.clone());
        }
        Ok(state.method_failures.get(method).map(GatewayResult::failed))
    }

    fn not_found(id: &GatewayId) -> DomainError {
        DomainError::new(
            ErrorCode::ExternalServiceError,
            format!("Gateway subscription not found: {}", id),
        )
    }
}

fn apply_update(subscription: &mut GatewaySubscription, update: &SubscriptionUpdate) {
    if let Some(plan_id) = &update.plan_id {
        subscription.plan_id = plan_id.clone();
    }

    subscription
        .discounts
        .retain(|d| !update.remove_discounts.contains(&d.id));
    for instruction in &update.add_discounts {
        subscription.discounts.push(Discount {
            id: instruction.inherited_from_id.clone(),
            amount: instruction.amount.unwrap_or_default(),
            number_of_billing_cycles: instruction.number_of_billing_cycles.unwrap_or(1),
        });
    }

    for change in &update.add_ons {
        match change {
            AddOnChange::Add {
                inherited_from_id,
                quantity,
            } => subscription.add_ons.push(AddOn {
                id: inherited_from_id.clone(),
                quantity: *quantity,
            }),
            AddOnChange::Update {
                existing_id,
                quantity,
            } => {
                if let Some(add_on) = subscription.add_ons.iter_mut().find(|a| &a.id == existing_id) {
                    add_on.quantity = *quantity;
                }
            }
            AddOnChange::Remove { existing_id } => {
                subscription.add_ons.retain(|a| &a.id != existing_id);
            }
        }
    }
}

#[async_trait]
impl SubscriptionGateway for MockSubscriptionGateway {
    async fn find(&self, id: &GatewayId) -> Result<GatewaySubscription, DomainError> {
        self.record_call("find", vec![id.to_string()]);
        if let Some(error) = self.state().method_errors.get("find") {
            return Err(error.clone());
        }

        self.subscription(id).ok_or_else(|| Self::not_found(id))
    }

    async fn update(
        &self,
        id: &GatewayId,
        update: SubscriptionUpdate,
    ) -> Result<GatewayResult, DomainError> {
        self.record_call("update", vec![id.to_string()]);
        self.state().updates.push((id.clone(), update.clone()));
        if let Some(failure) = self.check_method("update")? {
            return Ok(failure);
        }

        let mut state = self.state();
        let subscription = state
            .subscriptions
            .get_mut(id)
            .ok_or_else(|| Self::not_found(id))?;
        apply_update(subscription, &update);

        Ok(GatewayResult::succeeded(Some(subscription.clone())))
    }

    async fn cancel(&self, id: &GatewayId) -> Result<GatewayResult, DomainError> {
        self.record_call("cancel", vec![id.to_string()]);
        if let Some(failure) = self.check_method("cancel")? {
            return Ok(failure);
        }

        Ok(GatewayResult::succeeded(self.subscription(id)))
    }
}
