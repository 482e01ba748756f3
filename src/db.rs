// Pool construction, migrations, and the handful of Postgres-error-code
// classifiers the catalog needs to translate constraint violations into
// AppError kinds.

use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Error as SqlxError;

use crate::config::Settings;

pub async fn init_pool(settings: &Settings) -> Result<PgPool, SqlxError> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.database_max_connections)
        .connect(&settings.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Postgres SQLSTATE 23505: unique_violation.
pub fn is_unique_violation(err: &SqlxError) -> bool {
    matches!(err, SqlxError::Database(db) if db.code().as_deref() == Some("23505"))
}

/// Postgres SQLSTATE 23503: foreign_key_violation.
pub fn is_foreign_key_violation(err: &SqlxError) -> bool {
    matches!(err, SqlxError::Database(db) if db.code().as_deref() == Some("23503"))
}
