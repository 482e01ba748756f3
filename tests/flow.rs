// End-to-end coverage of the message-flow engine, run against a real,
// ephemeral Postgres database per test via `sqlx::test` (it applies
// `./migrations` and hands each test function a fresh, isolated schema).

use pubsub_broker::ack;
use pubsub_broker::catalog::{self, SubscriptionDefaults};
use pubsub_broker::consumer;
use pubsub_broker::dlq;
use pubsub_broker::janitor;
use pubsub_broker::metrics;
use pubsub_broker::models::{CreateSubscription, CreateTopic};
use pubsub_broker::publisher;
use pubsub_broker::validation::validate_filter;
use serde_json::json;
use sqlx::PgPool;
use std::time::Duration;

fn defaults() -> SubscriptionDefaults {
    SubscriptionDefaults {
        max_delivery_attempts: 5,
        backoff_min_seconds: 5,
        backoff_max_seconds: 300,
    }
}

async fn make_topic(pool: &PgPool, id: &str) {
    catalog::create_topic(pool, CreateTopic { id: id.to_string() })
        .await
        .unwrap();
}

async fn make_subscription(
    pool: &PgPool,
    id: &str,
    topic_id: &str,
    filter: Option<serde_json::Value>,
    overrides: SubscriptionDefaults,
) {
    catalog::create_subscription(
        pool,
        CreateSubscription {
            id: id.to_string(),
            topic_id: topic_id.to_string(),
            filter,
            max_delivery_attempts: Some(overrides.max_delivery_attempts),
            backoff_min_seconds: Some(overrides.backoff_min_seconds),
            backoff_max_seconds: Some(overrides.backoff_max_seconds),
        },
        &defaults(),
    )
    .await
    .unwrap();
}

/// S1 — happy path: publish, consume, ack, metrics settle to all-acked.
#[sqlx::test(migrations = "./migrations")]
async fn happy_path(pool: PgPool) {
    make_topic(&pool, "t").await;
    make_subscription(&pool, "s", "t", None, defaults()).await;

    let inserted = publisher::publish(&pool, "t", vec![json!({"k": 1}), json!({"k": 2})])
        .await
        .unwrap();
    assert_eq!(inserted, 2);

    let batch = consumer::consume(&pool, "s", "c1", 10).await.unwrap();
    assert_eq!(batch.len(), 2);
    assert!(batch.iter().all(|m| m.delivery_attempts == 1));

    let ids: Vec<_> = batch.iter().map(|m| m.id).collect();
    let acked = ack::ack(&pool, "s", &ids).await.unwrap();
    assert_eq!(acked, 2);

    let m = metrics::subscription_metrics(&pool, "s").await.unwrap();
    assert_eq!((m.available, m.delivered, m.acked, m.dlq), (0, 0, 2, 0));
}

/// S2 — fan-out with a per-subscription filter.
#[sqlx::test(migrations = "./migrations")]
async fn fan_out_with_filter(pool: PgPool) {
    make_topic(&pool, "t").await;
    make_subscription(&pool, "s1", "t", None, defaults()).await;
    make_subscription(
        &pool,
        "s2",
        "t",
        Some(json!({"country": ["BR"]})),
        defaults(),
    )
    .await;

    let inserted = publisher::publish(
        &pool,
        "t",
        vec![
            json!({"country": "BR"}),
            json!({"country": "US"}),
            json!({"country": "DE"}),
        ],
    )
    .await
    .unwrap();
    assert_eq!(inserted, 4);

    let batch_s1 = consumer::consume(&pool, "s1", "c1", 10).await.unwrap();
    assert_eq!(batch_s1.len(), 3);

    let batch_s2 = consumer::consume(&pool, "s2", "c1", 10).await.unwrap();
    assert_eq!(batch_s2.len(), 1);
    assert_eq!(batch_s2[0].payload["country"], json!("BR"));
}

/// S4 — DLQ promotion and reprocessing.
#[sqlx::test(migrations = "./migrations")]
async fn dlq_promotion_and_reprocess(pool: PgPool) {
    make_topic(&pool, "t").await;
    make_subscription(
        &pool,
        "s",
        "t",
        None,
        SubscriptionDefaults {
            max_delivery_attempts: 1,
            backoff_min_seconds: 1,
            backoff_max_seconds: 1,
        },
    )
    .await;

    publisher::publish(&pool, "t", vec![json!({"x": 1}), json!({"x": 2}), json!({"x": 3})])
        .await
        .unwrap();

    let batch = consumer::consume(&pool, "s", "c1", 10).await.unwrap();
    assert_eq!(batch.len(), 3);

    let ids: Vec<_> = batch.iter().map(|m| m.id).collect();
    let nacked = ack::nack(&pool, "s", &ids).await.unwrap();
    assert_eq!(nacked, 3);

    let dlq_messages = dlq::list_dlq(&pool, "s", 0, 10).await.unwrap();
    assert_eq!(dlq_messages.len(), 3);

    let reprocessed = dlq::reprocess_dlq(&pool, "s", &ids).await.unwrap();
    assert_eq!(reprocessed, 3);

    let batch_again = consumer::consume(&pool, "s", "c1", 10).await.unwrap();
    assert_eq!(batch_again.len(), 3);
    assert!(batch_again.iter().all(|m| m.delivery_attempts == 1));
}

/// Ack is idempotent: re-acking already-acked ids is a no-op.
#[sqlx::test(migrations = "./migrations")]
async fn ack_is_idempotent(pool: PgPool) {
    make_topic(&pool, "t").await;
    make_subscription(&pool, "s", "t", None, defaults()).await;
    publisher::publish(&pool, "t", vec![json!({"x": 1})]).await.unwrap();

    let batch = consumer::consume(&pool, "s", "c1", 10).await.unwrap();
    let ids: Vec<_> = batch.iter().map(|m| m.id).collect();

    assert_eq!(ack::ack(&pool, "s", &ids).await.unwrap(), 1);
    assert_eq!(ack::ack(&pool, "s", &ids).await.unwrap(), 0);
}

/// Two concurrent consumers on the same subscription never share a message.
#[sqlx::test(migrations = "./migrations")]
async fn concurrent_consumers_get_disjoint_batches(pool: PgPool) {
    make_topic(&pool, "t").await;
    make_subscription(&pool, "s", "t", None, defaults()).await;

    let messages: Vec<_> = (0..10).map(|i| json!({"i": i})).collect();
    publisher::publish(&pool, "t", messages).await.unwrap();

    let (batch_a, batch_b) = tokio::join!(
        consumer::consume(&pool, "s", "worker-a", 10),
        consumer::consume(&pool, "s", "worker-b", 10),
    );
    let batch_a = batch_a.unwrap();
    let batch_b = batch_b.unwrap();

    assert_eq!(batch_a.len() + batch_b.len(), 10);

    let ids_a: std::collections::HashSet<_> = batch_a.iter().map(|m| m.id).collect();
    let ids_b: std::collections::HashSet<_> = batch_b.iter().map(|m| m.id).collect();
    assert!(ids_a.is_disjoint(&ids_b));
}

/// Deleting a topic cascades through subscriptions to messages.
#[sqlx::test(migrations = "./migrations")]
async fn delete_topic_cascades(pool: PgPool) {
    make_topic(&pool, "t").await;
    make_subscription(&pool, "s", "t", None, defaults()).await;
    publisher::publish(&pool, "t", vec![json!({"x": 1})]).await.unwrap();

    catalog::delete_topic(&pool, "t").await.unwrap();

    assert!(catalog::get_subscription(&pool, "s").await.is_err());
    let m = metrics::subscription_metrics(&pool, "s").await.unwrap();
    assert_eq!((m.available, m.delivered, m.acked, m.dlq), (0, 0, 0, 0));
}

/// S3 — exponential backoff: a nack below max attempts reschedules the
/// message, invisible to `consume` until `available_at` elapses.
#[sqlx::test(migrations = "./migrations")]
async fn nack_reschedules_with_backoff(pool: PgPool) {
    make_topic(&pool, "t").await;
    make_subscription(
        &pool,
        "s",
        "t",
        None,
        SubscriptionDefaults {
            max_delivery_attempts: 5,
            backoff_min_seconds: 1,
            backoff_max_seconds: 1,
        },
    )
    .await;

    publisher::publish(&pool, "t", vec![json!({"x": 1})])
        .await
        .unwrap();

    let batch = consumer::consume(&pool, "s", "c1", 10).await.unwrap();
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].delivery_attempts, 1);

    let ids: Vec<_> = batch.iter().map(|m| m.id).collect();
    assert_eq!(ack::nack(&pool, "s", &ids).await.unwrap(), 1);

    // Not yet available: backoff hasn't elapsed.
    let immediate = consumer::consume(&pool, "s", "c1", 10).await.unwrap();
    assert_eq!(immediate.len(), 0);

    tokio::time::sleep(Duration::from_millis(1100)).await;

    let retried = consumer::consume(&pool, "s", "c1", 10).await.unwrap();
    assert_eq!(retried.len(), 1);
    assert_eq!(retried[0].delivery_attempts, 2);
}

/// S5 — a crashed consumer's lease is recovered by the janitor's stuck-lock
/// sweep; the attempt count survives and is bumped again on re-lease.
#[sqlx::test(migrations = "./migrations")]
async fn janitor_unlocks_stuck_leases(pool: PgPool) {
    make_topic(&pool, "t").await;
    make_subscription(&pool, "s", "t", None, defaults()).await;

    publisher::publish(
        &pool,
        "t",
        vec![json!({"x": 1}), json!({"x": 2}), json!({"x": 3})],
    )
    .await
    .unwrap();

    let batch = consumer::consume(&pool, "s", "crasher", 10).await.unwrap();
    assert_eq!(batch.len(), 3);

    // Never acked or nacked: a second consume sees nothing available.
    let second = consumer::consume(&pool, "s", "c2", 10).await.unwrap();
    assert_eq!(second.len(), 0);

    // Sweep with a zero-second timeout: every delivered lease is "stuck".
    let unlocked = janitor::unlock_stuck_leases(&pool, 0).await.unwrap();
    assert_eq!(unlocked, 3);

    let recovered = consumer::consume(&pool, "s", "c2", 10).await.unwrap();
    assert_eq!(recovered.len(), 3);
    assert!(recovered.iter().all(|m| m.delivery_attempts == 2));
}

/// Acked-message GC deletes rows past the retention window and leaves
/// fresher acked rows untouched.
#[sqlx::test(migrations = "./migrations")]
async fn janitor_gc_deletes_only_expired_acked_rows(pool: PgPool) {
    make_topic(&pool, "t").await;
    make_subscription(&pool, "s", "t", None, defaults()).await;

    publisher::publish(&pool, "t", vec![json!({"x": 1}), json!({"x": 2})])
        .await
        .unwrap();

    let batch = consumer::consume(&pool, "s", "c1", 10).await.unwrap();
    let ids: Vec<_> = batch.iter().map(|m| m.id).collect();
    ack::ack(&pool, "s", &ids).await.unwrap();

    // Retention window far in the future: nothing is old enough yet.
    let deleted = janitor::gc_acked_messages(&pool, 3600).await.unwrap();
    assert_eq!(deleted, 0);

    let m = metrics::subscription_metrics(&pool, "s").await.unwrap();
    assert_eq!(m.acked, 2);

    // Zero-second retention: both acked rows are now past it.
    let deleted = janitor::gc_acked_messages(&pool, 0).await.unwrap();
    assert_eq!(deleted, 2);

    let m = metrics::subscription_metrics(&pool, "s").await.unwrap();
    assert_eq!((m.available, m.delivered, m.acked, m.dlq), (0, 0, 0, 0));
}

/// S7 — filter shape validation at subscription creation time.
#[test]
fn filter_validation_matches_s7() {
    assert!(validate_filter(&Some(json!({"f": "not_an_array"}))).is_err());
    assert!(validate_filter(&Some(json!({"f": [1, "a", true]}))).is_ok());
}
