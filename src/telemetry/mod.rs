//! Tracing subscriber setup.
//!
//! | Setting | Description | Default |
//! |---------|-------------|---------|
//! | `logging.level` | Filter used when `RUST_LOG` is unset | `info` |
//! | `logging.format` | `pretty` or `json` output | `pretty` |

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, LoggingConfig};

/// Build the filter: `RUST_LOG` wins over the configured level.
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init_tracing(config: &LoggingConfig) {
    let json = config.format == LogFormat::Json;

    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();

    tracing::info!(format = ?config.format, "Tracing initialized");
}
