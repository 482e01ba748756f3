// Consumer (lease engine): atomically select, lock, and hand out a batch
// of available messages to a named consumer. The SKIP LOCKED
// select plus the UPDATE ... FROM in one statement is what gives us
// at-most-one-lease-holder and no head-of-line blocking across concurrent
// consumers without any in-process coordination.

use sqlx::PgPool;

use crate::error::AppResult;
use crate::models::{Message, MessageRow};
use crate::validation::validate_batch_size;

pub async fn consume(
    pool: &PgPool,
    subscription_id: &str,
    consumer_id: &str,
    batch_size: i64,
) -> AppResult<Vec<Message>> {
    validate_batch_size(batch_size)?;

    let rows = sqlx::query_as::<_, MessageRow>(
        r#"
        WITH cte AS (
            SELECT id
            FROM subscription_messages
            WHERE subscription_id = $1
              AND status = 'available'
              AND available_at <= now()
            ORDER BY available_at ASC
            LIMIT $3
            FOR UPDATE SKIP LOCKED
        )
        UPDATE subscription_messages sm
        SET status = 'delivered',
            locked_at = now(),
            locked_by = $2,
            delivery_attempts = delivery_attempts + 1
        FROM cte
        WHERE sm.id = cte.id
        RETURNING sm.id, sm.subscription_id, sm.payload, sm.status, sm.delivery_attempts,
                  sm.available_at, sm.locked_at, sm.locked_by, sm.created_at, sm.acked_at
        "#,
    )
    .bind(subscription_id)
    .bind(consumer_id)
    .bind(batch_size)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Message::from).collect())
}
