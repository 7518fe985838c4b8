//! Logging for the oaspec tools.
//!
//! Configures a `tracing-subscriber` registry writing to stderr, in JSON or
//! pretty form, and defines the standard event names the tools emit.
//!
//! # Usage
//!
//! ```no_run
//! use oaspec_telemetry::{LogFormat, TelemetryConfig};
//!
//! let config = TelemetryConfig::new()
//!     .with_log_level("debug")
//!     .with_log_format(LogFormat::Pretty);
//! oaspec_telemetry::init(&config).unwrap();
//! ```

pub mod config;
pub mod logging;

pub use config::{LogFormat, TelemetryConfig};
pub use logging::{events, init_logging as init};

use thiserror::Error;

/// Telemetry errors.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Failed to initialize logging.
    #[error("failed to initialize logging: {0}")]
    LoggingInit(String),

    /// A log format name that is neither `json` nor `pretty`.
    #[error("invalid log format '{0}' (expected json or pretty)")]
    InvalidLogFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TelemetryConfig::default();
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_config_builder() {
        let config = TelemetryConfig::new()
            .with_log_level("debug")
            .with_log_format(LogFormat::Json);

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_error_message() {
        let err = TelemetryError::LoggingInit("already set".into());
        assert_eq!(err.to_string(), "failed to initialize logging: already set");
    }
}
