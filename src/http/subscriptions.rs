use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::ack;
use crate::app_state::AppState;
use crate::catalog;
use crate::dlq;
use crate::consumer;
use crate::error::AppResult;
use crate::metrics;
use crate::models::{
    ConsumeQuery, CreateSubscription, ListResponse, Message, Pagination, Subscription,
    SubscriptionMetrics,
};

pub async fn create_subscription(
    State(state): State<AppState>,
    Json(data): Json<CreateSubscription>,
) -> AppResult<(StatusCode, Json<Subscription>)> {
    let subscription =
        catalog::create_subscription(&state.pool, data, &state.subscription_defaults).await?;
    Ok((StatusCode::CREATED, Json(subscription)))
}

pub async fn get_subscription(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Subscription>> {
    let subscription = catalog::get_subscription(&state.pool, &id).await?;
    Ok(Json(subscription))
}

pub async fn list_subscriptions(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> AppResult<Json<ListResponse<Subscription>>> {
    let subscriptions =
        catalog::list_subscriptions(&state.pool, page.offset, page.limit).await?;
    Ok(Json(ListResponse {
        data: subscriptions,
    }))
}

pub async fn delete_subscription(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    catalog::delete_subscription(&state.pool, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn consume_messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ConsumeQuery>,
) -> AppResult<Json<ListResponse<Message>>> {
    let messages = consumer::consume(
        &state.pool,
        &id,
        &query.consumer_id,
        query.batch_size,
    )
    .await?;
    Ok(Json(ListResponse { data: messages }))
}

// Ack/nack/reprocess bodies are plain arrays of message ids, per the
// fixed external contract (spec §6) — not wrapped in an object. The true
// affected-row count is still tracked internally (ack::ack/nack return
// it) but the HTTP contract only promises 204, never "exactly one row"
// (spec §7's "one-row convention", deliberately not replicated outward).

pub async fn ack_messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(message_ids): Json<Vec<Uuid>>,
) -> AppResult<StatusCode> {
    ack::ack(&state.pool, &id, &message_ids).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn nack_messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(message_ids): Json<Vec<Uuid>>,
) -> AppResult<StatusCode> {
    ack::nack(&state.pool, &id, &message_ids).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_dlq(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(page): Query<Pagination>,
) -> AppResult<Json<ListResponse<Message>>> {
    let messages = dlq::list_dlq(&state.pool, &id, page.offset, page.limit).await?;
    Ok(Json(ListResponse { data: messages }))
}

pub async fn reprocess_dlq(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(message_ids): Json<Vec<Uuid>>,
) -> AppResult<StatusCode> {
    dlq::reprocess_dlq(&state.pool, &id, &message_ids).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn subscription_metrics(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<SubscriptionMetrics>> {
    let metrics = metrics::subscription_metrics(&state.pool, &id).await?;
    Ok(Json(metrics))
}
