//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p order-store --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;

use chrono::Utc;
use order_store::{
    OrderId, OrderRecord, OrderStore, PostgresOrderStore, StoreError, UserId, Version,
};
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            // Create a temporary pool just for migrations
            let temp_pool = PgPool::connect(&connection_string).await.unwrap();

            sqlx::raw_sql(include_str!("../../../migrations/001_create_orders_table.sql"))
                .execute(&temp_pool)
                .await
                .unwrap();

            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

async fn create_store() -> PostgresOrderStore {
    let info = get_container_info().await;
    let pool = PgPool::connect(&info.connection_string).await.unwrap();
    PostgresOrderStore::new(pool)
}

fn test_record(owner_id: UserId, key: Option<&str>) -> OrderRecord {
    OrderRecord::new(
        OrderId::new(),
        owner_id,
        key.map(String::from),
        serde_json::json!({"status": "Paid", "total": "5020.00"}),
        Utc::now(),
    )
}

#[tokio::test]
async fn insert_and_get_roundtrip() {
    let store = create_store().await;
    let record = test_record(UserId::new(), None);
    let order_id = record.order_id;

    store.insert(record).await.unwrap();

    let stored = store.get(order_id).await.unwrap().unwrap();
    assert_eq!(stored.order_id, order_id);
    assert_eq!(stored.version, Version::first());
    assert_eq!(stored.payload["status"], "Paid");
}

#[tokio::test]
async fn duplicate_idempotency_key_rejected() {
    let store = create_store().await;
    let owner = UserId::new();
    let key = format!("key-{}", OrderId::new());

    store
        .insert(test_record(owner, Some(&key)))
        .await
        .unwrap();
    let result = store.insert(test_record(owner, Some(&key))).await;

    assert!(matches!(
        result,
        Err(StoreError::DuplicateIdempotencyKey(_))
    ));

    let found = store.find_by_idempotency_key(&key).await.unwrap();
    assert!(found.is_some());
}

#[tokio::test]
async fn update_with_stale_version_conflicts() {
    let store = create_store().await;
    let record = test_record(UserId::new(), None);
    let order_id = record.order_id;
    store.insert(record).await.unwrap();

    let new_version = store
        .update(
            order_id,
            Version::first(),
            serde_json::json!({"status": "Shipped"}),
            Utc::now(),
        )
        .await
        .unwrap();
    assert_eq!(new_version, Version::new(2));

    let result = store
        .update(
            order_id,
            Version::first(),
            serde_json::json!({"status": "Cancelled"}),
            Utc::now(),
        )
        .await;

    assert!(matches!(result, Err(StoreError::VersionConflict { .. })));
    let stored = store.get(order_id).await.unwrap().unwrap();
    assert_eq!(stored.payload["status"], "Shipped");
}

#[tokio::test]
async fn update_missing_order_fails() {
    let store = create_store().await;
    let result = store
        .update(
            OrderId::new(),
            Version::first(),
            serde_json::json!({}),
            Utc::now(),
        )
        .await;
    assert!(matches!(result, Err(StoreError::OrderNotFound(_))));
}

#[tokio::test]
async fn list_for_owner_returns_only_their_orders() {
    let store = create_store().await;
    let owner = UserId::new();
    let other = UserId::new();

    store.insert(test_record(owner, None)).await.unwrap();
    store.insert(test_record(owner, None)).await.unwrap();
    store.insert(test_record(other, None)).await.unwrap();

    let records = store.list_for_owner(owner).await.unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.owner_id == owner));
}
