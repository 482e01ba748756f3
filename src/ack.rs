// Ack/Nack engine: terminate a lease, either by finalizing the message or
// by rescheduling it with exponential backoff (or promoting it to the DLQ
// once attempts are exhausted).

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;

/// Acks the given ids that are currently `delivered`; everything else
/// (already acked, rescheduled, in the DLQ, or simply not found) is
/// silently skipped — the operation is idempotent by construction.
pub async fn ack(pool: &PgPool, subscription_id: &str, message_ids: &[Uuid]) -> AppResult<u64> {
    let result = sqlx::query(
        r#"
        UPDATE subscription_messages
        SET status = 'acked',
            acked_at = now(),
            locked_at = NULL,
            locked_by = NULL
        WHERE subscription_id = $1
          AND id = ANY($2)
          AND status = 'delivered'
        "#,
    )
    .bind(subscription_id)
    .bind(message_ids)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Nacks the given ids that are currently `delivered`. Each either goes
/// back to `available` with an exponential backoff delay, or is promoted
/// to `dlq` once `delivery_attempts` has reached the subscription's
/// `max_delivery_attempts`. Non-`delivered` rows are skipped.
pub async fn nack(pool: &PgPool, subscription_id: &str, message_ids: &[Uuid]) -> AppResult<u64> {
    let result = sqlx::query(
        r#"
        UPDATE subscription_messages sm
        SET status = CASE
                WHEN sm.delivery_attempts >= sub.max_delivery_attempts THEN 'dlq'
                ELSE 'available'
            END,
            available_at = CASE
                WHEN sm.delivery_attempts >= sub.max_delivery_attempts THEN sm.available_at
                ELSE now() + make_interval(secs => LEAST(
                    sub.backoff_max_seconds,
                    sub.backoff_min_seconds * POWER(2, sm.delivery_attempts)
                ))
            END,
            locked_at = NULL,
            locked_by = NULL
        FROM subscriptions sub
        WHERE sm.subscription_id = $1
          AND sub.id = $1
          AND sm.id = ANY($2)
          AND sm.status = 'delivered'
        "#,
    )
    .bind(subscription_id)
    .bind(message_ids)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
