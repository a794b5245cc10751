//! PostgreSQL implementation of SubscriptionRepository.
//!
//! Schema lives in `migrations/0001_create_subscriptions.sql`. The `prorate`
//! preference has no column; loaded aggregates always prorate.

use crate::domain::billing::Subscription;
use crate::domain::foundation::{
    DomainError, ErrorCode, GatewayId, OwnerId, SubscriptionId, Timestamp,
};
use crate::ports::SubscriptionRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

const SELECT_COLUMNS: &str = r#"
    SELECT id, owner_id, name, gateway_subscription_id, plan_id,
           trial_ends_at, ends_at, created_at, updated_at, version
    FROM subscriptions
"#;

/// PostgreSQL implementation of the SubscriptionRepository port.
pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a subscription.
#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: Uuid,
    owner_id: String,
    name: String,
    gateway_subscription_id: String,
    plan_id: String,
    trial_ends_at: Option<DateTime<Utc>>,
    ends_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: i32,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        Ok(Subscription {
            id: SubscriptionId::from_uuid(row.id),
            owner_id: OwnerId::new(row.owner_id).map_err(|e| corrupt_column("owner_id", e))?,
            name: row.name,
            gateway_subscription_id: GatewayId::new(row.gateway_subscription_id)
                .map_err(|e| corrupt_column("gateway_subscription_id", e))?,
            plan_id: GatewayId::new(row.plan_id).map_err(|e| corrupt_column("plan_id", e))?,
            trial_ends_at: row.trial_ends_at.map(Timestamp::from_datetime),
            ends_at: row.ends_at.map(Timestamp::from_datetime),
            prorate: true,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
            version: row.version,
        })
    }
}

fn corrupt_column(column: &str, err: impl std::fmt::Display) -> DomainError {
    DomainError::database(format!("Invalid {} value: {}", column, err))
}

fn query_failed(action: &str, err: sqlx::Error) -> DomainError {
    DomainError::database(format!("Failed to {} subscription: {}", action, err))
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn save(&self, subscription: &Subscription) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions (
                id, owner_id, name, gateway_subscription_id, plan_id,
                trial_ends_at, ends_at, created_at, updated_at, version
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(subscription.id.as_uuid())
        .bind(subscription.owner_id.as_str())
        .bind(&subscription.name)
        .bind(subscription.gateway_subscription_id.as_str())
        .bind(subscription.plan_id.as_str())
        .bind(subscription.trial_ends_at.map(|t| *t.as_datetime()))
        .bind(subscription.ends_at.map(|t| *t.as_datetime()))
        .bind(subscription.created_at.as_datetime())
        .bind(subscription.updated_at.as_datetime())
        .bind(subscription.version)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                match db_err.constraint() {
                    Some("subscriptions_gateway_subscription_id_key") => {
                        return DomainError::validation(
                            "gateway_subscription_id",
                            "Gateway subscription is already recorded",
                        );
                    }
                    Some("subscriptions_pkey") => {
                        return DomainError::validation("id", "Subscription already exists");
                    }
                    _ => {}
                }
            }
            query_failed("save", e)
        })?;

        Ok(())
    }

    async fn update(&self, subscription: &mut Subscription) -> Result<(), DomainError> {
        let updated_at = Timestamp::now();

        let result = sqlx::query(
            r#"
            UPDATE subscriptions SET
                name = $3,
                gateway_subscription_id = $4,
                plan_id = $5,
                trial_ends_at = $6,
                ends_at = $7,
                updated_at = $8,
                version = version + 1
            WHERE id = $1 AND version = $2
            "#,
        )
        .bind(subscription.id.as_uuid())
        .bind(subscription.version)
        .bind(&subscription.name)
        .bind(subscription.gateway_subscription_id.as_str())
        .bind(subscription.plan_id.as_str())
        .bind(subscription.trial_ends_at.map(|t| *t.as_datetime()))
        .bind(subscription.ends_at.map(|t| *t.as_datetime()))
        .bind(updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| query_failed("update", e))?;

        if result.rows_affected() == 0 {
            let stored: Option<i32> =
                sqlx::query_scalar("SELECT version FROM subscriptions WHERE id = $1")
                    .bind(subscription.id.as_uuid())
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(|e| query_failed("update", e))?;

            return Err(match stored {
                None => DomainError::new(ErrorCode::SubscriptionNotFound, "Subscription not found"),
                Some(version) => DomainError::conflict(format!(
                    "Subscription {} was modified concurrently (expected version {}, found {})",
                    subscription.id, subscription.version, version
                )),
            });
        }

        subscription.version += 1;
        subscription.updated_at = updated_at;
        Ok(())
    }

    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, DomainError> {
        let row: Option<SubscriptionRow> =
            sqlx::query_as(&format!("{} WHERE id = $1", SELECT_COLUMNS))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| query_failed("find", e))?;

        row.map(Subscription::try_from).transpose()
    }

    async fn find_by_gateway_id(
        &self,
        gateway_id: &GatewayId,
    ) -> Result<Option<Subscription>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(&format!(
            "{} WHERE gateway_subscription_id = $1",
            SELECT_COLUMNS
        ))
        .bind(gateway_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| query_failed("find", e))?;

        row.map(Subscription::try_from).transpose()
    }

    async fn find_by_owner(&self, owner_id: &OwnerId) -> Result<Vec<Subscription>, DomainError> {
        let rows: Vec<SubscriptionRow> = sqlx::query_as(&format!(
            "{} WHERE owner_id = $1 ORDER BY created_at ASC",
            SELECT_COLUMNS
        ))
        .bind(owner_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| query_failed("list", e))?;

        rows.into_iter().map(Subscription::try_from).collect()
    }
}
