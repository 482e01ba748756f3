// Per-subscription message counts by state. One aggregate
// query, filtered counts.

use sqlx::PgPool;

use crate::error::AppResult;
use crate::models::SubscriptionMetrics;

pub async fn subscription_metrics(
    pool: &PgPool,
    subscription_id: &str,
) -> AppResult<SubscriptionMetrics> {
    let row: (i64, i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT
            count(*) FILTER (WHERE status = 'available'),
            count(*) FILTER (WHERE status = 'delivered'),
            count(*) FILTER (WHERE status = 'acked'),
            count(*) FILTER (WHERE status = 'dlq')
        FROM subscription_messages
        WHERE subscription_id = $1
        "#,
    )
    .bind(subscription_id)
    .fetch_one(pool)
    .await?;

    Ok(SubscriptionMetrics {
        subscription_id: subscription_id.to_string(),
        available: row.0,
        delivered: row.1,
        acked: row.2,
        dlq: row.3,
    })
}
