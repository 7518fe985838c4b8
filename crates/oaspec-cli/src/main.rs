//! oaspec command-line tool.
//!
//! Validates OpenAPI 3.x documents and converts them between JSON and YAML.

use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};

use oaspec::{Document, DocumentState, FetchOptions, Source, Spec, SpecError};
use oaspec_telemetry::{
    log_source_fetched, log_source_unavailable, log_spec_converted, log_spec_loaded,
    log_validation_failure, LogFormat, TelemetryConfig,
};

#[derive(Parser, Debug)]
#[command(name = "oaspec", about = "Validate and convert OpenAPI 3.x documents", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, global = true, env = "OASPEC_LOG", default_value = "warn")]
    log_level: String,

    /// Log output format (json or pretty).
    #[arg(long, global = true, env = "OASPEC_LOG_FORMAT", default_value = "pretty")]
    log_format: String,

    /// Timeout in seconds for documents fetched over HTTP.
    #[arg(long, global = true)]
    timeout: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate OpenAPI document(s).
    ///
    /// Every failing field is reported with its fully qualified path.
    Validate {
        /// Input document(s): file paths (YAML or JSON) or HTTP(S) URLs.
        #[arg(short, long, required = true, num_args = 1..)]
        spec: Vec<String>,

        /// Output format (text or json).
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Convert a document to JSON or YAML.
    Convert {
        /// Input document: file path or HTTP(S) URL.
        #[arg(short, long)]
        spec: String,

        /// Target format.
        #[arg(long, value_parser = ["json", "yaml"])]
        to: String,

        /// Output file. Defaults to stdout.
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// Validation result for a single document.
#[derive(serde::Serialize)]
struct ValidationResult {
    source: String,
    valid: bool,
    errors: Vec<ValidationIssue>,
}

#[derive(serde::Serialize)]
struct ValidationIssue {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
}

impl ValidationIssue {
    /// A non-field error; the code prefix is split out of the message.
    fn from_error(error: &SpecError) -> Self {
        let code = error.code();
        let text = error.to_string();
        let message = text
            .strip_prefix(code)
            .and_then(|rest| rest.strip_prefix(": "))
            .unwrap_or(&text)
            .to_string();
        Self {
            code: code.to_string(),
            message,
            field: None,
        }
    }
}

fn fetch_options(timeout: Option<u64>) -> FetchOptions {
    match timeout {
        Some(secs) => FetchOptions::default().with_timeout(Duration::from_secs(secs)),
        None => FetchOptions::default(),
    }
}

fn validate_one(location: &str, options: &FetchOptions) -> ValidationResult {
    let source = Source::locate(location).with_fetch_options(options.clone());
    let is_remote = matches!(source, Source::Url { .. });
    let mut document = Document::new(source);

    let mut errors = Vec::new();
    match document.load() {
        Ok(state) => {
            if is_remote {
                log_source_fetched!(source = %location);
            }
            match (state, document.spec(), document.errors()) {
                (DocumentState::Valid, Some(spec), _) => {
                    log_spec_loaded!(
                        source = %location,
                        title = spec.info().title(),
                        operations = spec.operations().len()
                    );
                }
                (DocumentState::Invalid, _, Some(field_errors)) => {
                    log_validation_failure!(source = %location, errors = field_errors.len());
                    errors.extend(field_errors.iter().map(|e| ValidationIssue {
                        code: "E1003".to_string(),
                        message: e.message.clone(),
                        field: Some(e.field.clone()),
                    }));
                }
                (state, _, _) => {
                    tracing::error!(source = %location, state = %state, "document did not settle");
                    errors.push(ValidationIssue {
                        code: "E1003".to_string(),
                        message: format!("document ended in state '{}'", state),
                        field: None,
                    });
                }
            }
        }
        Err(e) => {
            if matches!(e, SpecError::SourceUnavailable { .. }) {
                log_source_unavailable!(source = %location, error = %e);
            }
            errors.push(ValidationIssue::from_error(&e));
        }
    }

    ValidationResult {
        source: location.to_string(),
        valid: errors.is_empty(),
        errors,
    }
}

/// Run the validate command.
fn run_validate(specs: &[String], output_format: &str, options: &FetchOptions) -> ExitCode {
    let results: Vec<ValidationResult> = specs
        .iter()
        .map(|location| validate_one(location, options))
        .collect();
    let valid_count = results.iter().filter(|r| r.valid).count();
    let total = results.len();

    if output_format == "json" {
        let output = serde_json::json!({
            "results": results,
            "summary": {
                "total": total,
                "valid": valid_count,
                "invalid": total - valid_count,
            }
        });
        println!("{:#}", output);
    } else {
        for result in &results {
            if result.valid {
                eprintln!("✓ {} is valid", result.source);
            } else {
                eprintln!("✗ {} has {} error(s)", result.source, result.errors.len());
            }

            for err in &result.errors {
                if let Some(field) = &err.field {
                    eprintln!("  {} [{}]: {}", err.code, field, err.message);
                } else {
                    eprintln!("  {}: {}", err.code, err.message);
                }
            }
        }

        eprintln!();
        eprintln!(
            "validated {} spec(s): {} valid, {} invalid",
            total,
            valid_count,
            total - valid_count
        );
    }

    if valid_count == total {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

fn load_spec(location: &str, options: &FetchOptions) -> Result<Spec, SpecError> {
    match Source::locate(location) {
        Source::Url { url, .. } => {
            let spec = Spec::from_url_with(&url, options)?;
            log_source_fetched!(source = %url);
            Ok(spec)
        }
        _ => Spec::from_file(location),
    }
}

/// Run the convert command.
fn run_convert(spec: &str, to: &str, output: Option<&str>, options: &FetchOptions) -> ExitCode {
    let loaded = match load_spec(spec, options) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("error: {}", e);
            if let Some(errors) = e.validation_errors() {
                for err in errors {
                    eprintln!("  {}", err);
                }
            }
            return ExitCode::from(1);
        }
    };

    let text = if to == "json" {
        let mut text = loaded.to_json();
        text.push('\n');
        text
    } else {
        loaded.to_yaml()
    };

    match output {
        Some(path) => {
            if let Err(e) = std::fs::write(Path::new(path), &text) {
                eprintln!("error: failed to write {}: {}", path, e);
                return ExitCode::from(1);
            }
            log_spec_converted!(source = %spec, to = %to, output = %path);
            eprintln!("converted {} to {} ({})", spec, path, to);
        }
        None => {
            print!("{}", text);
            log_spec_converted!(source = %spec, to = %to);
        }
    }

    ExitCode::SUCCESS
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_format = match cli.log_format.parse::<LogFormat>() {
        Ok(format) => format,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(1);
        }
    };
    let telemetry = TelemetryConfig::new()
        .with_log_level(&cli.log_level)
        .with_log_format(log_format);
    if let Err(e) = oaspec_telemetry::init(&telemetry) {
        eprintln!("warning: {}", e);
    }

    let options = fetch_options(cli.timeout);
    match cli.command {
        Commands::Validate { spec, format } => run_validate(&spec, &format, &options),
        Commands::Convert { spec, to, output } => {
            run_convert(&spec, &to, output.as_deref(), &options)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn issue_from_error_strips_code() {
        let err = SpecError::SourceUnavailable {
            location: "api.yaml".into(),
            reason: "not found".into(),
        };
        let issue = ValidationIssue::from_error(&err);
        assert_eq!(issue.code, "E1004");
        assert_eq!(issue.message, "source unavailable: api.yaml: not found");
        assert!(issue.field.is_none());
    }

    #[test]
    fn missing_file_is_reported_not_panicked() {
        let result = validate_one("does-not-exist.yaml", &FetchOptions::default());
        assert!(!result.valid);
        assert_eq!(result.errors[0].code, "E1004");
    }

    #[test]
    fn timeout_flag_maps_to_fetch_options() {
        assert_eq!(fetch_options(None).timeout, None);
        assert_eq!(fetch_options(Some(3)).timeout, Some(Duration::from_secs(3)));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "oaspec",
            "validate",
            "--spec",
            "a.yaml",
            "--log-format",
            "json",
            "--timeout",
            "5",
        ])
        .unwrap();
        assert_eq!(cli.log_format, "json");
        assert_eq!(cli.timeout, Some(5));
    }
}
