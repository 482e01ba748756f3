// Shared application state, injected into every axum handler. The engine
// keeps no in-process mutable state about messages or leases: the pool and
// the subscription defaults are the only things handlers need.

use sqlx::PgPool;
use std::sync::Arc;

use crate::catalog::SubscriptionDefaults;
use crate::config::Settings;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub subscription_defaults: Arc<SubscriptionDefaults>,
}

impl AppState {
    pub fn new(pool: PgPool, settings: &Settings) -> Self {
        Self {
            pool,
            subscription_defaults: Arc::new(SubscriptionDefaults {
                max_delivery_attempts: settings.subscription_max_delivery_attempts,
                backoff_min_seconds: settings.subscription_backoff_min_seconds,
                backoff_max_seconds: settings.subscription_backoff_max_seconds,
            }),
        }
    }
}
