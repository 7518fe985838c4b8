//! Test harness for the oaspec tools.
//!
//! Holds the shared fixture location and CLI regression tests that run the
//! `oaspec` binary as a subprocess.

use std::path::PathBuf;

#[cfg(test)]
pub mod cli;

/// Absolute path to the shared test fixtures directory.
pub fn fixtures() -> PathBuf {
    // CARGO_MANIFEST_DIR = .../crates/oaspec-test
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("crates/")
        .parent()
        .expect("workspace root")
        .join("tests/fixtures")
}

/// Path of a named fixture file.
pub fn fixture(name: &str) -> PathBuf {
    fixtures().join(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use oaspec::{Document, DocumentState, Source, Spec};

    #[test]
    fn valid_fixtures_load() {
        for name in ["petstore.yaml", "petstore.json", "minimal.yaml"] {
            let spec = Spec::from_file(fixture(name));
            assert!(spec.is_ok(), "{} should load: {:?}", name, spec.err());
        }
    }

    #[test]
    fn yaml_and_json_petstore_are_the_same_document() {
        let yaml = Spec::from_file(fixture("petstore.yaml")).unwrap();
        let json = Spec::from_file(fixture("petstore.json")).unwrap();
        assert_eq!(yaml, json);
    }

    #[test]
    fn invalid_fixture_reports_every_field() {
        let mut doc = Document::new(Source::File(fixture("invalid-missing-fields.yaml")));
        assert_eq!(doc.load().unwrap(), DocumentState::Invalid);
        assert_eq!(
            doc.errors().unwrap().fields(),
            vec![
                "info.version",
                "info.contact.url",
                "info.license.url",
                "paths./pets.get.parameters[0].in",
                "paths./pets.get.responses",
            ]
        );
    }

    #[test]
    fn parse_error_fixture_is_not_a_validation_failure() {
        let err = Spec::from_file(fixture("invalid-parse-error.yaml")).unwrap_err();
        assert_eq!(err.code(), "E1002");
    }
}
