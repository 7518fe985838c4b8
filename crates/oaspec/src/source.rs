//! Reading document text from files and URLs and parsing it into raw mappings.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde_json::{Map, Value};

use crate::error::SpecError;

/// Default `User-Agent` sent when fetching documents.
pub const DEFAULT_USER_AGENT: &str = concat!("oaspec/", env!("CARGO_PKG_VERSION"));

/// A structured-text format for whole documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    Json,
    Yaml,
}

impl TextFormat {
    /// Guess the format from a file extension; anything but `.json` is YAML.
    pub fn from_path(path: &str) -> Self {
        let lower = path.to_ascii_lowercase();
        if lower.ends_with(".json") {
            TextFormat::Json
        } else {
            TextFormat::Yaml
        }
    }

    /// Parse text in this format into a raw mapping.
    pub fn parse(self, text: &str) -> Result<Map<String, Value>, SpecError> {
        let parsed = match self {
            TextFormat::Json => serde_json::from_str::<Value>(text).map_err(|e| e.to_string()),
            TextFormat::Yaml => serde_yaml::from_str::<Value>(text).map_err(|e| e.to_string()),
        };

        match parsed {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(SpecError::Parse {
                format: self,
                reason: "document root is not a mapping".to_string(),
            }),
            Err(reason) => Err(SpecError::Parse {
                format: self,
                reason,
            }),
        }
    }
}

impl fmt::Display for TextFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextFormat::Json => f.write_str("JSON"),
            TextFormat::Yaml => f.write_str("YAML"),
        }
    }
}

/// Options for fetching documents over HTTP.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Overall request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl FetchOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Whether `location` looks like an HTTP(S) URL rather than a file path.
pub fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Read a file to a string.
pub fn read_file(path: &Path) -> Result<String, SpecError> {
    let text = std::fs::read_to_string(path).map_err(|e| SpecError::SourceUnavailable {
        location: path.display().to_string(),
        reason: e.to_string(),
    })?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "source read");
    Ok(text)
}

/// Fetch a document body with a blocking GET.
pub fn fetch_url(url: &str, options: &FetchOptions) -> Result<String, SpecError> {
    let unavailable = |reason: String| SpecError::SourceUnavailable {
        location: url.to_string(),
        reason,
    };

    // The blocking client defaults to a 30s timeout; `None` must clear it.
    let client = reqwest::blocking::Client::builder()
        .user_agent(options.user_agent.as_str())
        .timeout(options.timeout)
        .build()
        .map_err(|e| unavailable(format!("failed to create HTTP client: {}", e)))?;

    let response = client
        .get(url)
        .send()
        .map_err(|e| unavailable(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(unavailable(format!("HTTP {}", status)));
    }

    let text = response.text().map_err(|e| unavailable(e.to_string()))?;
    tracing::debug!(url = %url, status = status.as_u16(), bytes = text.len(), "source fetched");
    Ok(text)
}
