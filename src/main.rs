use pubsub_broker::app_state::AppState;
use pubsub_broker::config::Settings;
use pubsub_broker::{db, http, janitor};
use std::net::SocketAddr;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .json()
        .init();

    let settings = Settings::from_env()?;

    info!("connecting to database...");
    let pool = db::init_pool(&settings).await?;

    let state = AppState::new(pool, &settings);

    spawn_janitor(state.clone(), &settings);

    let app = http::build_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.http_host, settings.http_port).parse()?;
    info!(%addr, "starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Runs both janitor sweeps on a fixed interval for the lifetime of the
/// process: one spawned loop, ticking on a `tokio::time::interval`, logging
/// but never panicking on a failed sweep so a single bad tick doesn't kill
/// the loop.
fn spawn_janitor(state: AppState, settings: &Settings) {
    let pool = state.pool.clone();
    let lock_timeout_seconds = settings.janitor_lock_timeout_seconds;
    let retention_seconds = settings.janitor_retention_seconds;
    let interval = settings.janitor_interval();

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;

            match janitor::unlock_stuck_leases(&pool, lock_timeout_seconds).await {
                Ok(n) if n > 0 => info!(count = n, "unlocked stuck leases"),
                Ok(_) => {}
                Err(err) => error!(error = %err, "failed to sweep stuck leases"),
            }

            match janitor::gc_acked_messages(&pool, retention_seconds).await {
                Ok(n) if n > 0 => info!(count = n, "garbage-collected acked messages"),
                Ok(_) => {}
                Err(err) => error!(error = %err, "failed to sweep acked messages"),
            }
        }
    });
}
