use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::app_state::AppState;
use crate::catalog;
use crate::error::AppResult;
use crate::models::{CreateTopic, ListResponse, Pagination, Topic};
use crate::publisher;

pub async fn create_topic(
    State(state): State<AppState>,
    Json(data): Json<CreateTopic>,
) -> AppResult<(StatusCode, Json<Topic>)> {
    let topic = catalog::create_topic(&state.pool, data).await?;
    Ok((StatusCode::CREATED, Json(topic)))
}

pub async fn get_topic(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Topic>> {
    let topic = catalog::get_topic(&state.pool, &id).await?;
    Ok(Json(topic))
}

pub async fn list_topics(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> AppResult<Json<ListResponse<Topic>>> {
    let topics = catalog::list_topics(&state.pool, page.offset, page.limit).await?;
    Ok(Json(ListResponse { data: topics }))
}

pub async fn delete_topic(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    catalog::delete_topic(&state.pool, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn publish_messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(messages): Json<Vec<serde_json::Value>>,
) -> AppResult<StatusCode> {
    // Confirm the topic exists up front so a missing topic surfaces as 404
    // even when the message list is empty.
    catalog::get_topic(&state.pool, &id).await?;
    publisher::publish(&state.pool, &id, messages).await?;
    Ok(StatusCode::NO_CONTENT)
}
