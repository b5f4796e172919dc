use std::io;
use tracing_subscriber::{fmt, EnvFilter};

/// Directives used when neither `RUST_LOG` nor a configured level is available.
pub const DEFAULT_DIRECTIVES: &str = "info,tower_http=info,axum=info,sqlx=warn";

/// Build the filter: `RUST_LOG` wins, then `level` (e.g. `debug`), then defaults.
pub fn env_filter(level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| match level {
        Some(l) if !l.trim().is_empty() => {
            EnvFilter::new(format!("{},tower_http={},axum={},sqlx=warn", l, l, l))
        }
        _ => EnvFilter::new(DEFAULT_DIRECTIVES),
    })
}

/// Initialize tracing subscriber with sensible defaults and stdout writer.
/// - Respects `RUST_LOG` if set
/// - Falls back to `info,tower_http=info,axum=info`
/// - Writes to stdout to improve visibility in environments that hide stderr
pub fn init_logging_default() {
    init_logging_compact(None);
}

/// Compact human-readable output with an optional base level.
pub fn init_logging_compact(level: Option<&str>) {
    let _ = fmt()
        .with_env_filter(env_filter(level))
        .with_target(false)
        .compact()
        .with_writer(io::stdout)
        .try_init();
}

/// Initialize tracing subscriber with JSON structured output.
/// - Respects `RUST_LOG` if set, otherwise uses `level` or `info`
/// - Writes to stdout for consistent container logging behavior
pub fn init_logging_json(level: Option<&str>) {
    let _ = fmt()
        .with_env_filter(env_filter(level))
        .with_target(false)
        .json()
        .with_writer(io::stdout)
        .try_init();
}
