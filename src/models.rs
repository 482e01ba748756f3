// Domain model for topics, subscriptions, and per-subscription messages.
// Each entity has a DB row type (sqlx::FromRow, raw column shapes) and the
// same struct doubles as the API-facing serialization type since no field
// needs to be hidden or reshaped on the way out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Topic {
    pub id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Subscription {
    pub id: String,
    pub topic_id: String,
    pub filter: serde_json::Value,
    pub max_delivery_attempts: i32,
    pub backoff_min_seconds: i32,
    pub backoff_max_seconds: i32,
    pub created_at: DateTime<Utc>,
}

/// Closed enum for message state ("polymorphism by variant, not
/// inheritance"). Stored as plain TEXT in the database; the conversions
/// below are the only place that knows the wire/column representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Available,
    Delivered,
    Acked,
    Dlq,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Available => "available",
            MessageStatus::Delivered => "delivered",
            MessageStatus::Acked => "acked",
            MessageStatus::Dlq => "dlq",
        }
    }
}

impl std::str::FromStr for MessageStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(MessageStatus::Available),
            "delivered" => Ok(MessageStatus::Delivered),
            "acked" => Ok(MessageStatus::Acked),
            "dlq" => Ok(MessageStatus::Dlq),
            other => Err(format!("unknown message status: {other}")),
        }
    }
}

/// Raw row shape as it comes back from `subscription_messages`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MessageRow {
    pub id: Uuid,
    pub subscription_id: String,
    pub payload: serde_json::Value,
    pub status: String,
    pub delivery_attempts: i32,
    pub available_at: DateTime<Utc>,
    pub locked_at: Option<DateTime<Utc>>,
    pub locked_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub acked_at: Option<DateTime<Utc>>,
}

/// API-facing message shape.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub id: Uuid,
    pub subscription_id: String,
    pub payload: serde_json::Value,
    pub status: MessageStatus,
    pub delivery_attempts: i32,
    pub available_at: DateTime<Utc>,
    pub locked_at: Option<DateTime<Utc>>,
    pub locked_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub acked_at: Option<DateTime<Utc>>,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        let status = row.status.parse().unwrap_or(MessageStatus::Available);
        Message {
            id: row.id,
            subscription_id: row.subscription_id,
            payload: row.payload,
            status,
            delivery_attempts: row.delivery_attempts,
            available_at: row.available_at,
            locked_at: row.locked_at,
            locked_by: row.locked_by,
            created_at: row.created_at,
            acked_at: row.acked_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionMetrics {
    pub subscription_id: String,
    pub available: i64,
    pub delivered: i64,
    pub acked: i64,
    pub dlq: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateTopic {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateSubscription {
    pub id: String,
    pub topic_id: String,
    #[serde(default)]
    pub filter: Option<serde_json::Value>,
    pub max_delivery_attempts: Option<i32>,
    pub backoff_min_seconds: Option<i32>,
    pub backoff_max_seconds: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub offset: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    10
}

#[derive(Debug, Serialize)]
pub struct ListResponse<T: Serialize> {
    pub data: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct ConsumeQuery {
    pub consumer_id: String,
    #[serde(default = "default_limit")]
    pub batch_size: i64,
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}
