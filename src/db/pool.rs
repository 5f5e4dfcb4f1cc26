use crate::config::DatabaseConfig;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;
use std::time::Duration;

/// Statements slower than this are logged at `warn`
const SLOW_STATEMENT_THRESHOLD: Duration = Duration::from_secs(5);

/// How long a request waits for a free connection before failing
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// Create the connection pool for the count record store.
///
/// The pool is sized by `database.max_connections` and shared by every
/// request through the reconciliation service. Fails when the URL does not
/// parse or the first connection cannot be opened.
pub async fn create_pool(database: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let connect_options = PgConnectOptions::from_str(&database.url)?
        .log_slow_statements(tracing::log::LevelFilter::Warn, SLOW_STATEMENT_THRESHOLD);

    let pool = PgPoolOptions::new()
        .max_connections(database.max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect_with(connect_options)
        .await?;

    tracing::debug!(
        "Count record store pool ready (max {} connections)",
        database.max_connections
    );
    Ok(pool)
}
