//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the billing domain to external systems:
//! - `gateway` - In-process payment gateway doubles
//! - `http` - Axum webhook endpoint
//! - `memory` - In-memory repository for tests and local runs
//! - `postgres` - sqlx-backed repository

pub mod gateway;
pub mod http;
pub mod memory;
pub mod postgres;

pub use gateway::{MockNotificationParser, MockOwnerBilling, MockPlanCatalog, MockSubscriptionGateway};
pub use memory::InMemorySubscriptionRepository;
pub use postgres::PostgresSubscriptionRepository;
