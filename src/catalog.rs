// Catalog: create/get/list/delete for topics and subscriptions.
// Every write here is a single, individually-transactional statement;
// uniqueness and the subscription -> topic foreign key are enforced by the
// store and translated into AppError kinds.

use sqlx::PgPool;

use crate::db::{is_foreign_key_violation, is_unique_violation};
use crate::error::{AppError, AppResult};
use crate::models::{CreateSubscription, CreateTopic, Subscription, Topic};
use crate::validation::{validate_filter, validate_id, validate_pagination};

pub async fn create_topic(pool: &PgPool, data: CreateTopic) -> AppResult<Topic> {
    validate_id("id", &data.id)?;

    sqlx::query_as::<_, Topic>(
        "INSERT INTO topics (id) VALUES ($1) RETURNING id, created_at",
    )
    .bind(&data.id)
    .fetch_one(pool)
    .await
    .map_err(|err| {
        if is_unique_violation(&err) {
            AppError::AlreadyExists("this topic already exists".to_string())
        } else {
            AppError::Internal(err)
        }
    })
}

pub async fn get_topic(pool: &PgPool, topic_id: &str) -> AppResult<Topic> {
    sqlx::query_as::<_, Topic>("SELECT id, created_at FROM topics WHERE id = $1")
        .bind(topic_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("topic not found".to_string()))
}

pub async fn list_topics(pool: &PgPool, offset: i64, limit: i64) -> AppResult<Vec<Topic>> {
    validate_pagination(offset, limit)?;

    let topics = sqlx::query_as::<_, Topic>(
        "SELECT id, created_at FROM topics ORDER BY id ASC OFFSET $1 LIMIT $2",
    )
    .bind(offset)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(topics)
}

pub async fn delete_topic(pool: &PgPool, topic_id: &str) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM topics WHERE id = $1")
        .bind(topic_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("topic not found".to_string()));
    }
    Ok(())
}

pub async fn create_subscription(
    pool: &PgPool,
    data: CreateSubscription,
    defaults: &SubscriptionDefaults,
) -> AppResult<Subscription> {
    validate_id("id", &data.id)?;
    validate_id("topic_id", &data.topic_id)?;
    validate_filter(&data.filter)?;

    let filter = data.filter.unwrap_or_else(|| serde_json::json!({}));
    let max_delivery_attempts = data
        .max_delivery_attempts
        .unwrap_or(defaults.max_delivery_attempts);
    let backoff_min_seconds = data
        .backoff_min_seconds
        .unwrap_or(defaults.backoff_min_seconds);
    let backoff_max_seconds = data
        .backoff_max_seconds
        .unwrap_or(defaults.backoff_max_seconds);

    if max_delivery_attempts < 1 {
        return Err(AppError::Validation(
            "max_delivery_attempts must be >= 1".to_string(),
        ));
    }
    if backoff_min_seconds < 1 {
        return Err(AppError::Validation(
            "backoff_min_seconds must be >= 1".to_string(),
        ));
    }
    if backoff_max_seconds < backoff_min_seconds {
        return Err(AppError::Validation(
            "backoff_max_seconds must be >= backoff_min_seconds".to_string(),
        ));
    }

    sqlx::query_as::<_, Subscription>(
        "INSERT INTO subscriptions
            (id, topic_id, filter, max_delivery_attempts, backoff_min_seconds, backoff_max_seconds)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING id, topic_id, filter, max_delivery_attempts, backoff_min_seconds, backoff_max_seconds, created_at",
    )
    .bind(&data.id)
    .bind(&data.topic_id)
    .bind(&filter)
    .bind(max_delivery_attempts)
    .bind(backoff_min_seconds)
    .bind(backoff_max_seconds)
    .fetch_one(pool)
    .await
    .map_err(|err| {
        if is_unique_violation(&err) {
            AppError::AlreadyExists("this subscription already exists".to_string())
        } else if is_foreign_key_violation(&err) {
            AppError::NotFound("topic not found".to_string())
        } else {
            AppError::Internal(err)
        }
    })
}

pub struct SubscriptionDefaults {
    pub max_delivery_attempts: i32,
    pub backoff_min_seconds: i32,
    pub backoff_max_seconds: i32,
}

pub async fn get_subscription(pool: &PgPool, subscription_id: &str) -> AppResult<Subscription> {
    sqlx::query_as::<_, Subscription>(
        "SELECT id, topic_id, filter, max_delivery_attempts, backoff_min_seconds, backoff_max_seconds, created_at
         FROM subscriptions WHERE id = $1",
    )
    .bind(subscription_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("subscription not found".to_string()))
}

pub async fn list_subscriptions(
    pool: &PgPool,
    offset: i64,
    limit: i64,
) -> AppResult<Vec<Subscription>> {
    validate_pagination(offset, limit)?;

    let subscriptions = sqlx::query_as::<_, Subscription>(
        "SELECT id, topic_id, filter, max_delivery_attempts, backoff_min_seconds, backoff_max_seconds, created_at
         FROM subscriptions ORDER BY id ASC OFFSET $1 LIMIT $2",
    )
    .bind(offset)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(subscriptions)
}

pub async fn delete_subscription(pool: &PgPool, subscription_id: &str) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM subscriptions WHERE id = $1")
        .bind(subscription_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("subscription not found".to_string()));
    }
    Ok(())
}
