// Publisher: fan-out a batch of published messages to every subscription
// on a topic, one row per (subscription, matching message) pair.
//
// The match is expressed as a single INSERT ... SELECT joining subscriptions
// against the unnested input array rather than a per-subscription loop in
// Rust. Payload values are compared as text against each filter's allowed
// values, so a numeric field like `1` matches a filter entry written as the
// string `"1"` — the comparison is deliberately text-coerced, not typed.

use sqlx::PgPool;

use crate::error::{AppError, AppResult};

pub async fn publish(
    pool: &PgPool,
    topic_id: &str,
    messages: Vec<serde_json::Value>,
) -> AppResult<i64> {
    // (a) filter input to well-formed JSON objects; non-objects are silently
    // dropped before they ever reach the store.
    let objects: Vec<serde_json::Value> = messages
        .into_iter()
        .filter(|m| m.is_object())
        .collect();

    let mut tx = pool.begin().await?;

    let topic_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM topics WHERE id = $1)")
            .bind(topic_id)
            .fetch_one(&mut *tx)
            .await?;

    if !topic_exists {
        return Err(AppError::NotFound("topic not found".to_string()));
    }

    if objects.is_empty() {
        tx.commit().await?;
        return Ok(0);
    }

    let payload_array = serde_json::Value::Array(objects);

    let result = sqlx::query(
        r#"
        WITH input_messages AS (
            SELECT value AS payload
            FROM jsonb_array_elements($2::jsonb) AS value
        ),
        eligible AS (
            SELECT s.id AS subscription_id, m.payload
            FROM subscriptions s
            CROSS JOIN input_messages m
            WHERE s.topic_id = $1
              AND (
                s.filter IS NULL
                OR jsonb_typeof(s.filter) <> 'object'
                OR s.filter = '{}'::jsonb
                OR NOT EXISTS (
                    SELECT 1
                    FROM jsonb_each(s.filter) f(key, allowed_values)
                    WHERE jsonb_typeof(f.allowed_values) = 'array'
                      AND NOT (
                          m.payload ->> f.key = ANY (
                              SELECT jsonb_array_elements_text(f.allowed_values)
                          )
                      )
                )
              )
        )
        INSERT INTO subscription_messages (subscription_id, payload)
        SELECT subscription_id, payload FROM eligible
        "#,
    )
    .bind(topic_id)
    .bind(&payload_array)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(result.rows_affected() as i64)
}
