//! Process-wide log sink, installed once from `main`.
use anyhow::{anyhow, Result};
use std::io::IsTerminal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding a tracing filter directive.
pub const LOG_ENV: &str = "GRID_EXPORT_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Directive used when neither `GRID_EXPORT_LOG` nor `RUST_LOG` is set.
    pub default_directive: String,
    pub with_target: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            default_directive: "debug".to_string(),
            with_target: false,
        }
    }
}

impl LogSettings {
    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_env(LOG_ENV)
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new(&self.default_directive))
    }
}

/// Install the stderr subscriber. Fails if one is already installed.
pub fn init(settings: &LogSettings) -> Result<()> {
    let stderr = std::io::stderr();
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(stderr.is_terminal())
        .with_target(settings.with_target);
    tracing_subscriber::registry()
        .with(settings.filter())
        .with(layer)
        .try_init()
        .map_err(|err| anyhow!("install log subscriber: {err}"))
}
