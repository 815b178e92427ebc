//! Logging setup for tools embedding the campaign engine
//!
//! The library itself only emits `tracing` events. Binaries call
//! [`setup_logging`] once at startup to install a subscriber on stderr,
//! leaving stdout to the report they print.

use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{CampaignError, Result};

/// How a campaign tool reports its progress
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Most verbose level shown unless `RUST_LOG` says otherwise
    pub level: Level,
    /// One JSON object per event instead of human readable lines
    pub json: bool,
    /// Tool name for the startup line
    pub app_name: String,
}

impl LoggingConfig {
    pub fn new(level: Level, app_name: impl Into<String>) -> Self {
        LoggingConfig {
            level,
            json: false,
            app_name: app_name.into(),
        }
    }

    /// Emit JSON events, for piping inspection runs into log tooling
    pub fn with_json(mut self) -> Self {
        self.json = true;
        self
    }

    /// Source locations are only worth the noise when debugging heuristics
    fn source_locations(&self) -> bool {
        self.level >= Level::DEBUG
    }
}

/// Install the global subscriber
///
/// `RUST_LOG` directives are honoured on top of the configured level.
/// Installing a second global subscriber fails with a config error.
pub fn setup_logging(config: LoggingConfig) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(config.level.into());
    let locations = config.source_locations();

    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_file(locations)
        .with_line_number(locations)
        .with_writer(std::io::stderr);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| CampaignError::config(format!("Cannot install logger: {}", e)))?;

    tracing::info!("🚀 Starting {} v{}", config.app_name, env!("CARGO_PKG_VERSION"));
    Ok(())
}

/// Parse a `--log-level` value
pub fn parse_log_level(level: &str) -> Result<Level> {
    Level::from_str(level)
        .map_err(|_| CampaignError::config(format!("Invalid log level: {}", level)))
}
