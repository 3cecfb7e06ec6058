use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    OrderId, OrderRecord, Result, StoreError, UserId,
    record::Version,
    store::OrderStore,
};

/// PostgreSQL-backed order store implementation.
///
/// One row per order; the aggregate state lives in a JSONB payload column.
/// Uniqueness of order id and idempotency key is enforced by the database,
/// and compare-and-swap updates ride on a `WHERE version = $n` clause.
#[derive(Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    /// Creates a new PostgreSQL order store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_record(row: PgRow) -> Result<OrderRecord> {
        Ok(OrderRecord {
            order_id: OrderId::from_uuid(row.try_get::<Uuid, _>("id").map_err(StoreError::Database)?),
            owner_id: UserId::from_uuid(
                row.try_get::<Uuid, _>("owner_id")
                    .map_err(StoreError::Database)?,
            ),
            idempotency_key: row
                .try_get("idempotency_key")
                .map_err(StoreError::Database)?,
            version: Version::new(row.try_get("version").map_err(StoreError::Database)?),
            payload: row.try_get("payload").map_err(StoreError::Database)?,
            created_at: row.try_get("created_at").map_err(StoreError::Database)?,
            updated_at: row.try_get("updated_at").map_err(StoreError::Database)?,
        })
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn insert(&self, record: OrderRecord) -> Result<()> {
        let order_id = record.order_id;

        sqlx::query(
            r#"
            INSERT INTO orders (id, owner_id, idempotency_key, version, payload, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.order_id.as_uuid())
        .bind(record.owner_id.as_uuid())
        .bind(&record.idempotency_key)
        .bind(record.version.as_i64())
        .bind(&record.payload)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                match db_err.constraint() {
                    Some("orders_pkey") => return StoreError::DuplicateOrder(order_id),
                    Some("orders_idempotency_key_unique") => {
                        return StoreError::DuplicateIdempotencyKey(
                            record.idempotency_key.clone().unwrap_or_default(),
                        );
                    }
                    _ => {}
                }
            }
            StoreError::Database(e)
        })?;

        Ok(())
    }

    async fn get(&self, order_id: OrderId) -> Result<Option<OrderRecord>> {
        let row = sqlx::query(
            "SELECT id, owner_id, idempotency_key, version, payload, created_at, updated_at
             FROM orders WHERE id = $1",
        )
        .bind(order_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_record).transpose()
    }

    async fn find_by_idempotency_key(&self, key: &str) -> Result<Option<OrderRecord>> {
        let row = sqlx::query(
            "SELECT id, owner_id, idempotency_key, version, payload, created_at, updated_at
             FROM orders WHERE idempotency_key = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_record).transpose()
    }

    async fn update(
        &self,
        order_id: OrderId,
        expected: Version,
        payload: serde_json::Value,
        updated_at: DateTime<Utc>,
    ) -> Result<Version> {
        let new_version: Option<i64> = sqlx::query_scalar(
            "UPDATE orders SET version = version + 1, payload = $3, updated_at = $4
             WHERE id = $1 AND version = $2
             RETURNING version",
        )
        .bind(order_id.as_uuid())
        .bind(expected.as_i64())
        .bind(&payload)
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(version) = new_version {
            return Ok(Version::new(version));
        }

        // No row matched: either the order is gone or the version moved on.
        let actual: Option<i64> = sqlx::query_scalar("SELECT version FROM orders WHERE id = $1")
            .bind(order_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        match actual {
            Some(actual) => Err(StoreError::VersionConflict {
                order_id,
                expected,
                actual: Version::new(actual),
            }),
            None => Err(StoreError::OrderNotFound(order_id)),
        }
    }

    async fn list_for_owner(&self, owner_id: UserId) -> Result<Vec<OrderRecord>> {
        let rows = sqlx::query(
            "SELECT id, owner_id, idempotency_key, version, payload, created_at, updated_at
             FROM orders WHERE owner_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_record).collect()
    }

    async fn list_all(&self) -> Result<Vec<OrderRecord>> {
        let rows = sqlx::query(
            "SELECT id, owner_id, idempotency_key, version, payload, created_at, updated_at
             FROM orders ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_record).collect()
    }
}
