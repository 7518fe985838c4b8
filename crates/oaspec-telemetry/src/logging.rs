//! Structured logging to stderr.
//!
//! Stdout is reserved for command output (reports, converted documents).

use crate::{LogFormat, TelemetryConfig, TelemetryError};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize the logging subsystem.
///
/// `RUST_LOG` overrides the configured level when set.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.filter_directive()));

    match config.log_format {
        LogFormat::Json => init_json_logging(filter),
        LogFormat::Pretty => init_pretty_logging(filter),
    }
}

fn init_json_logging(filter: EnvFilter) -> Result<(), TelemetryError> {
    let json_layer = fmt::layer()
        .json()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_current_span(false)
        .with_span_list(false)
        .with_file(false)
        .with_line_number(false)
        .flatten_event(true)
        .with_filter(filter);

    tracing_subscriber::registry()
        .with(json_layer)
        .try_init()
        .map_err(|e: tracing_subscriber::util::TryInitError| {
            TelemetryError::LoggingInit(e.to_string())
        })
}

fn init_pretty_logging(filter: EnvFilter) -> Result<(), TelemetryError> {
    let pretty_layer = fmt::layer()
        .pretty()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(filter);

    tracing_subscriber::registry()
        .with(pretty_layer)
        .try_init()
        .map_err(|e: tracing_subscriber::util::TryInitError| {
            TelemetryError::LoggingInit(e.to_string())
        })
}

/// Standard log event names.
pub mod events {
    /// A document loaded and validated.
    pub const SPEC_LOADED: &str = "spec_loaded";

    /// A document failed validation.
    pub const VALIDATION_FAILURE: &str = "validation_failure";

    /// A document was fetched from a URL.
    pub const SOURCE_FETCHED: &str = "source_fetched";

    /// A file or URL could not be read.
    pub const SOURCE_UNAVAILABLE: &str = "source_unavailable";

    /// A document was converted to another format.
    pub const SPEC_CONVERTED: &str = "spec_converted";
}

/// Helper macros for structured logging with standard fields.
///
/// These wrap the tracing macros to ensure consistent field naming.
#[macro_export]
macro_rules! log_spec_loaded {
    ($($field:tt)*) => {
        tracing::info!(
            event = $crate::logging::events::SPEC_LOADED,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_validation_failure {
    ($($field:tt)*) => {
        tracing::warn!(
            event = $crate::logging::events::VALIDATION_FAILURE,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_source_fetched {
    ($($field:tt)*) => {
        tracing::info!(
            event = $crate::logging::events::SOURCE_FETCHED,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_source_unavailable {
    ($($field:tt)*) => {
        tracing::error!(
            event = $crate::logging::events::SOURCE_UNAVAILABLE,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_spec_converted {
    ($($field:tt)*) => {
        tracing::info!(
            event = $crate::logging::events::SPEC_CONVERTED,
            $($field)*
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    // The global subscriber can only be installed once per process, so
    // initialization itself is covered by the CLI tests.

    #[test]
    fn test_event_names_are_snake_case() {
        for name in [
            events::SPEC_LOADED,
            events::VALIDATION_FAILURE,
            events::SOURCE_FETCHED,
            events::SOURCE_UNAVAILABLE,
            events::SPEC_CONVERTED,
        ] {
            assert!(name.chars().all(|c| c.is_ascii_lowercase() || c == '_'));
        }
    }
}
