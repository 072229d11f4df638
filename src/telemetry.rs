//! Tracing subscriber setup.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber.
///
/// `log_level` accepts any `EnvFilter` directive string (e.g. `info` or
/// `range_shortener=debug,sqlx=warn`); an unparsable value falls back to
/// `info`. `log_format` selects between human-readable `text` and `json`.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(log_level: &str, log_format: &str) -> Result<()> {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = if log_format == "json" {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))
}
