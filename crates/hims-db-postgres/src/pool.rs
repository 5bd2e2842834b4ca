//! Pool construction.

use std::str::FromStr;
use std::time::Duration;

use sqlx_core::pool::PoolOptions;
use sqlx_postgres::{PgConnectOptions, PgPool, Postgres};
use tracing::{info, instrument};

use crate::config::{APPLICATION_NAME, PostgresConfig};
use crate::error::Result;

/// Opens a pool for `config`, failing fast on invalid settings or an
/// unreachable server.
#[instrument(skip(config), fields(url = %mask_password(&config.url)))]
pub async fn create_pool(config: &PostgresConfig) -> Result<PgPool> {
    config.validate()?;

    let mut connect =
        PgConnectOptions::from_str(&config.url)?.application_name(APPLICATION_NAME);
    if let Some(ms) = config.lock_timeout_ms {
        connect = connect.options([("lock_timeout", format!("{ms}ms"))]);
    }

    let pool = PoolOptions::<Postgres>::new()
        .max_connections(config.pool_size)
        .acquire_timeout(Duration::from_millis(config.connect_timeout_ms))
        .idle_timeout(config.idle_timeout_ms.map(Duration::from_millis))
        .connect_with(connect)
        .await?;

    info!(
        pool_size = config.pool_size,
        lock_timeout_ms = ?config.lock_timeout_ms,
        "PostgreSQL pool ready"
    );
    Ok(pool)
}

/// Replaces the password of a connection URL with `****` for logging.
pub fn mask_password(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let Some((userinfo, host)) = rest.rsplit_once('@') else {
        return url.to_string();
    };
    match userinfo.split_once(':') {
        Some((user, _)) => format!("{scheme}://{user}:****@{host}"),
        None => url.to_string(),
    }
}
