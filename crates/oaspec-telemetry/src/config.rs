//! Logging options for the oaspec tools.

use std::fmt;
use std::str::FromStr;

use crate::TelemetryError;

/// Crates whose events a bare level applies to.
const OWN_TARGETS: &[&str] = &["oaspec", "oaspec_cli", "oaspec_telemetry"];

/// Level kept for third-party targets (HTTP client internals) under a bare level.
const DEPENDENCY_LEVEL: &str = "warn";

/// How log events are rendered on stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event, for piping into log tooling.
    Json,
    /// Multi-line human-readable output for terminals.
    #[default]
    Pretty,
}

impl LogFormat {
    /// Accepted spellings, as shown in error messages.
    pub const NAMES: &'static [&'static str] = &["json", "pretty"];

    pub fn as_str(self) -> &'static str {
        match self {
            LogFormat::Json => "json",
            LogFormat::Pretty => "pretty",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogFormat {
    type Err = TelemetryError;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            _ => Err(TelemetryError::InvalidLogFormat(s.to_string())),
        }
    }
}

/// Logging options taken from the command line.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// A bare level (`debug`) or a full filter directive (`oaspec=trace,reqwest=debug`).
    /// `RUST_LOG` takes precedence when set.
    pub log_level: String,

    pub log_format: LogFormat,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            log_format: LogFormat::default(),
        }
    }
}

impl TelemetryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.log_format = format;
        self
    }

    /// The `EnvFilter` directive for this config.
    ///
    /// A bare level applies to the oaspec crates only; dependencies stay at
    /// `warn` so `--log-level debug` does not flood stderr with HTTP client
    /// internals. Anything containing `=` or `,` is passed through untouched.
    pub fn filter_directive(&self) -> String {
        let level = self.log_level.trim();
        if level.contains('=') || level.contains(',') {
            return level.to_string();
        }

        let mut directive = DEPENDENCY_LEVEL.to_string();
        for target in OWN_TARGETS {
            directive.push_str(&format!(",{}={}", target, level));
        }
        directive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_names_round_trip() {
        for name in LogFormat::NAMES {
            let format: LogFormat = name.parse().unwrap();
            assert_eq!(format.as_str(), *name);
        }
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
    }

    #[test]
    fn unknown_log_format_names_the_choices() {
        let err = "xml".parse::<LogFormat>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid log format 'xml' (expected json or pretty)"
        );
    }

    #[test]
    fn bare_level_is_scoped_to_own_crates() {
        let config = TelemetryConfig::new().with_log_level("debug");
        assert_eq!(
            config.filter_directive(),
            "warn,oaspec=debug,oaspec_cli=debug,oaspec_telemetry=debug"
        );
    }

    #[test]
    fn full_directive_passes_through() {
        let config = TelemetryConfig::new().with_log_level("oaspec=trace,reqwest=debug");
        assert_eq!(config.filter_directive(), "oaspec=trace,reqwest=debug");
    }
}
