// Liveness/readiness probes. Liveness never touches the store; readiness
// does, so it is the one that can fail when Postgres is unreachable.

use axum::extract::State;
use axum::Json;

use crate::app_state::AppState;
use crate::error::{AppError, AppResult};
use crate::models::HealthStatus;

pub async fn liveness() -> Json<HealthStatus> {
    Json(HealthStatus { status: "alive" })
}

pub async fn readiness(State(state): State<AppState>) -> AppResult<Json<HealthStatus>> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.pool)
        .await
        .map_err(|_| AppError::ServiceUnavailable("database is not reachable".to_string()))?;

    Ok(Json(HealthStatus { status: "ready" }))
}
