// DLQ manager: list dead-lettered messages and reprocess them back to
// `available`.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{Message, MessageRow};
use crate::validation::validate_pagination;

pub async fn list_dlq(
    pool: &PgPool,
    subscription_id: &str,
    offset: i64,
    limit: i64,
) -> AppResult<Vec<Message>> {
    validate_pagination(offset, limit)?;

    let rows = sqlx::query_as::<_, MessageRow>(
        r#"
        SELECT id, subscription_id, payload, status, delivery_attempts,
               available_at, locked_at, locked_by, created_at, acked_at
        FROM subscription_messages
        WHERE subscription_id = $1 AND status = 'dlq'
        ORDER BY created_at ASC
        OFFSET $2 LIMIT $3
        "#,
    )
    .bind(subscription_id)
    .bind(offset)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Message::from).collect())
}

/// Moves the given `dlq` ids back to `available`, resetting their attempt
/// count. Non-`dlq` rows (already reprocessed, or never in the DLQ) are
/// skipped.
pub async fn reprocess_dlq(
    pool: &PgPool,
    subscription_id: &str,
    message_ids: &[Uuid],
) -> AppResult<u64> {
    let result = sqlx::query(
        r#"
        UPDATE subscription_messages
        SET status = 'available',
            delivery_attempts = 0,
            available_at = now()
        WHERE subscription_id = $1
          AND id = ANY($2)
          AND status = 'dlq'
        "#,
    )
    .bind(subscription_id)
    .bind(message_ids)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
