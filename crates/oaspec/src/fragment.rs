//! Structured-text fragments attached to code artifacts.
//!
//! A fragment is a YAML mapping describing part of a document, typically a
//! path item next to the handler that serves it. Fragments are attached
//! either statically through [`Documented`] or at runtime through a
//! [`FragmentTable`].

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::SpecError;

/// An artifact carrying a fragment.
///
/// ```
/// use oaspec::{Documented, Method, PathItem, SpecObject};
///
/// struct ListPets;
///
/// impl Documented for ListPets {
///     const NAME: &'static str = "list_pets";
///     const FRAGMENT: &'static str = "
///         get:
///           summary: List all pets
///           responses:
///             '200':
///               description: A list of pets
///     ";
/// }
///
/// let item = PathItem::from_documented::<ListPets>().unwrap();
/// assert!(item.operation(Method::Get).is_some());
/// ```
pub trait Documented {
    const NAME: &'static str;
    const FRAGMENT: &'static str;
}

/// Strip common leading indentation.
///
/// Only spaces and tabs count as indentation. The first line is stripped on
/// its own and ignored when computing the margin. Leading and trailing blank
/// lines are dropped.
pub fn dedent(text: &str) -> String {
    let mut lines: Vec<&str> = text.lines().collect();
    if lines.is_empty() {
        return String::new();
    }

    let margin = lines[1..]
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| indent(line))
        .min()
        .unwrap_or(0);

    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    out.push(lines.remove(0).trim_start().to_string());
    for line in lines {
        let cut = margin.min(indent(line));
        out.push(line[cut..].trim_end().to_string());
    }

    let start = out.iter().position(|l| !l.trim().is_empty());
    let end = out.iter().rposition(|l| !l.trim().is_empty());
    match (start, end) {
        (Some(start), Some(end)) => out[start..=end].join("\n"),
        _ => String::new(),
    }
}

/// Byte length of the leading space/tab run; always a char boundary.
fn indent(line: &str) -> usize {
    line.len() - line.trim_start_matches([' ', '\t']).len()
}

/// Dedent and parse fragment text into a raw mapping.
pub fn parse_fragment(artifact: &str, text: &str) -> Result<Map<String, Value>, SpecError> {
    let malformed = |reason: String| SpecError::MalformedDocumentation {
        artifact: artifact.to_string(),
        reason,
    };

    let body = dedent(text);
    if body.is_empty() {
        return Err(malformed("fragment is blank".to_string()));
    }

    match serde_yaml::from_str::<Value>(&body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(malformed("fragment is not a mapping".to_string())),
        Err(e) => Err(malformed(format!("invalid YAML: {}", e))),
    }
}

/// Extract the raw mapping attached to `D`.
pub fn extract<D: Documented>() -> Result<Map<String, Value>, SpecError> {
    parse_fragment(D::NAME, D::FRAGMENT)
}

/// Runtime association of artifact names to fragment text.
#[derive(Debug, Clone, Default)]
pub struct FragmentTable {
    entries: BTreeMap<String, String>,
}

impl FragmentTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate `text` with `artifact`, replacing any earlier entry.
    pub fn register(&mut self, artifact: impl Into<String>, text: impl Into<String>) {
        let artifact = artifact.into();
        if self.entries.insert(artifact.clone(), text.into()).is_some() {
            tracing::warn!(artifact = %artifact, "fragment registered twice, replacing");
        }
    }

    pub fn register_documented<D: Documented>(&mut self) {
        self.register(D::NAME, D::FRAGMENT);
    }

    pub fn with(mut self, artifact: impl Into<String>, text: impl Into<String>) -> Self {
        self.register(artifact, text);
        self
    }

    pub fn get(&self, artifact: &str) -> Option<&str> {
        self.entries.get(artifact).map(String::as_str)
    }

    pub fn contains(&self, artifact: &str) -> bool {
        self.entries.contains_key(artifact)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Extract the raw mapping registered for `artifact`.
    pub fn extract(&self, artifact: &str) -> Result<Map<String, Value>, SpecError> {
        let text = self
            .get(artifact)
            .ok_or_else(|| SpecError::MalformedDocumentation {
                artifact: artifact.to_string(),
                reason: "no fragment attached".to_string(),
            })?;
        parse_fragment(artifact, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dedent_strips_common_margin() {
        let text = "
            get:
              summary: hi
            post:
              summary: bye
        ";
        assert_eq!(
            dedent(text),
            "get:\n  summary: hi\npost:\n  summary: bye"
        );
    }

    #[test]
    fn dedent_handles_text_on_first_line() {
        let text = "title: T
                    version: '1'";
        assert_eq!(dedent(text), "title: T\nversion: '1'");
    }

    #[test]
    fn dedent_ignores_blank_lines_for_margin() {
        let text = "\n    a: 1\n\n    b: 2\n";
        assert_eq!(dedent(text), "a: 1\n\nb: 2");
    }

    #[test]
    fn dedent_of_blank_text_is_empty() {
        assert_eq!(dedent(""), "");
        assert_eq!(dedent("   \n  \n"), "");
    }

    #[test]
    fn dedent_leaves_non_ascii_whitespace_in_place() {
        let text = "\n x: 1\n\u{a0}y: 2\n";
        assert_eq!(dedent(text), " x: 1\n\u{a0}y: 2");

        let text = "\n    a: 1\n  \u{a0}  b: 2\n";
        assert_eq!(dedent(text), "  a: 1\n\u{a0}  b: 2");
    }

    #[test]
    fn odd_whitespace_fails_without_panicking() {
        let result = parse_fragment("handler", "\n x: 1\n\u{a0}y: 2\n");
        if let Err(err) = result {
            assert_eq!(err.code(), "E1001");
        }

        let table = FragmentTable::new().with("handler", "\n\u{3000}a: 1\n b: 2\n");
        if let Err(err) = table.extract("handler") {
            assert_eq!(err.code(), "E1001");
        }
    }

    #[test]
    fn parses_indented_yaml() {
        let raw = parse_fragment(
            "handler",
            "
            get:
              responses:
                '200':
                  description: ok
            ",
        )
        .unwrap();
        assert_eq!(
            Value::Object(raw),
            json!({"get": {"responses": {"200": {"description": "ok"}}}})
        );
    }

    #[test]
    fn blank_fragment_is_malformed() {
        let err = parse_fragment("handler", "   ").unwrap_err();
        assert!(matches!(err, SpecError::MalformedDocumentation { ref artifact, .. } if artifact == "handler"));
        assert_eq!(err.code(), "E1001");
    }

    #[test]
    fn scalar_fragment_is_malformed() {
        let err = parse_fragment("handler", "just a sentence").unwrap_err();
        assert!(err.to_string().contains("not a mapping"));
    }

    #[test]
    fn invalid_yaml_is_malformed() {
        let err = parse_fragment("handler", "get: [unclosed").unwrap_err();
        assert!(err.to_string().contains("invalid YAML"));
    }

    #[test]
    fn table_replaces_and_reports_missing() {
        let mut table = FragmentTable::new().with("a", "x: 1");
        table.register("a", "x: 2");
        assert_eq!(table.len(), 1);
        assert_eq!(table.extract("a").unwrap()["x"], json!(2));

        let err = table.extract("b").unwrap_err();
        assert!(err.to_string().contains("no fragment attached"));
    }

    struct Handler;

    impl Documented for Handler {
        const NAME: &'static str = "handler";
        const FRAGMENT: &'static str = "
            summary: Pets
        ";
    }

    #[test]
    fn documented_artifacts_extract_their_fragment() {
        assert_eq!(extract::<Handler>().unwrap()["summary"], json!("Pets"));

        let mut table = FragmentTable::new();
        table.register_documented::<Handler>();
        assert!(table.contains("handler"));
    }
}
