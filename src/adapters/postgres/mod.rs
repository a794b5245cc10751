//! PostgreSQL adapters - Database implementations for repository ports.

mod subscription_repository;

pub use subscription_repository::PostgresSubscriptionRepository;

use sqlx::PgPool;

/// Apply the bundled `migrations/` to `pool`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
