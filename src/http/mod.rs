// HTTP/JSON control plane. Thin handlers: extract, validate, delegate to
// the core operation, map the result — no business logic lives here.

mod monitoring;
mod subscriptions;
mod topics;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/topics", post(topics::create_topic).get(topics::list_topics))
        .route(
            "/topics/{id}",
            get(topics::get_topic).delete(topics::delete_topic),
        )
        .route("/topics/{id}/messages", post(topics::publish_messages))
        .route(
            "/subscriptions",
            post(subscriptions::create_subscription).get(subscriptions::list_subscriptions),
        )
        .route(
            "/subscriptions/{id}",
            get(subscriptions::get_subscription).delete(subscriptions::delete_subscription),
        )
        .route(
            "/subscriptions/{id}/messages",
            get(subscriptions::consume_messages),
        )
        .route("/subscriptions/{id}/acks", post(subscriptions::ack_messages))
        .route(
            "/subscriptions/{id}/nacks",
            post(subscriptions::nack_messages),
        )
        .route("/subscriptions/{id}/dlq", get(subscriptions::list_dlq))
        .route(
            "/subscriptions/{id}/dlq/reprocess",
            post(subscriptions::reprocess_dlq),
        )
        .route(
            "/subscriptions/{id}/metrics",
            get(subscriptions::subscription_metrics),
        )
        .route("/liveness", get(monitoring::liveness))
        .route("/readiness", get(monitoring::readiness))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
