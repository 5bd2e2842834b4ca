//! Tracing setup. `RUST_LOG` takes precedence over `logging.level`.

use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*, reload};

static FILTER_HANDLE: OnceLock<reload::Handle<EnvFilter, Registry>> = OnceLock::new();

fn filter_for(level: &str) -> EnvFilter {
    match std::env::var_os(EnvFilter::DEFAULT_ENV) {
        Some(_) => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        None => EnvFilter::new(level),
    }
}

/// Installs the global subscriber at `info`. Later calls are no-ops.
pub fn init_tracing() {
    let (filter, handle) = reload::Layer::new(filter_for("info"));
    if FILTER_HANDLE.set(handle).is_err() {
        return;
    }
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init();
}

/// Switches to the configured level once the config file is loaded.
pub fn apply_logging_level(level: &str) {
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        return;
    }
    if let Some(handle) = FILTER_HANDLE.get()
        && let Err(e) = handle.reload(EnvFilter::new(level))
    {
        tracing::warn!(error = %e, level, "Failed to apply logging level");
    }
}
