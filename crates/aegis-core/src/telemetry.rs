//! Tracing subscriber setup.
//!
//! Only the first initialisation in a process takes effect; later calls are
//! ignored.

use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::TelemetryConfig;

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `level` when set. With `json`, log lines are
/// newline-delimited JSON.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false))
            .try_init()
            .ok();
    }
}

/// [`init_tracing`] from config; an unrecognised level falls back to `info`.
pub fn init_from_config(config: &TelemetryConfig) {
    let level = Level::from_str(&config.level).unwrap_or(Level::INFO);
    init_tracing(config.json, level);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_harmless() {
        init_from_config(&TelemetryConfig {
            json: true,
            level: "verbose".to_string(),
        });
        init_tracing(false, Level::DEBUG);
    }
}
