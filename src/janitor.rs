// Janitor: two idempotent sweeps, safe to run on any schedule, each a
// single transaction. Both sweep globally across all subscriptions rather
// than taking a subscription id, since there's no reason a caller should
// have to enumerate subscriptions just to keep the store clean.

use sqlx::PgPool;

use crate::error::AppResult;

/// Clears leases that have been held past `lock_timeout_seconds` without
/// an ack or nack, returning them to `available`. `delivery_attempts` and
/// `available_at` are left untouched: the next `consume` re-leases them
/// immediately, bumping attempts, which is how a crashed consumer's work
/// gets picked back up without losing the attempt count.
pub async fn unlock_stuck_leases(pool: &PgPool, lock_timeout_seconds: i64) -> AppResult<u64> {
    let result = sqlx::query(
        r#"
        UPDATE subscription_messages
        SET status = 'available',
            locked_at = NULL,
            locked_by = NULL
        WHERE status = 'delivered'
          AND locked_at < now() - make_interval(secs => $1)
        "#,
    )
    .bind(lock_timeout_seconds as f64)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Deletes `acked` rows older than `retention_seconds`, bounding storage
/// growth for messages nobody needs anymore.
pub async fn gc_acked_messages(pool: &PgPool, retention_seconds: i64) -> AppResult<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM subscription_messages
        WHERE status = 'acked'
          AND acked_at < now() - make_interval(secs => $1)
        "#,
    )
    .bind(retention_seconds as f64)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
