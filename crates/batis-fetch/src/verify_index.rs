//! Index verification
//!
//! Checks a `batis_index.json` document and collects every problem found,
//! without stopping at the first one.

use std::sync::LazyLock;

use batis_core::types::SUPPORTED_FORMAT_VERSION;
use regex::Regex;
use serde_json::{Map, Value};

static VERSION_DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("version digits regex is valid"));

/// Length of a hex-encoded SHA-512 digest
const SHA512_HEX_LEN: usize = 128;

/// Name of a JSON value's type, for messages
fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Verifies an index document
pub struct IndexVerifier<'a> {
    contents: &'a Value,
}

impl<'a> IndexVerifier<'a> {
    pub fn new(contents: &'a Value) -> Self {
        Self { contents }
    }

    /// Run every check
    pub fn verify(&self) -> Vec<String> {
        let mut problems = Vec::new();
        self.verify_json(&mut problems);
        problems
    }

    pub fn verify_json(&self, problems: &mut Vec<String>) {
        let Value::Object(index) = self.contents else {
            problems.push(format!(
                "Index must be a JSON object at the top level, not {}",
                json_type(self.contents)
            ));
            return;
        };

        verify_top_level_string(index, "name", true, problems);
        verify_top_level_string(index, "byline", true, problems);
        verify_top_level_string(index, "icon_url", false, problems);

        match index.get("format_version") {
            None => problems.push("Index should have a format_version field".to_string()),
            Some(fv) => match fv.as_array().filter(|parts| parts.len() == 2) {
                Some(parts) => {
                    let supported = parts
                        .iter()
                        .zip(SUPPORTED_FORMAT_VERSION)
                        .all(|(part, want)| part.as_u64() == Some(want));
                    if !supported {
                        problems.push(format!(
                            "This code is only to verify format_version 1.0 (found {}.{})",
                            parts[0], parts[1]
                        ));
                    }
                }
                None => problems.push(format!(
                    "format_version is not a list of length 2: {}",
                    fv
                )),
            },
        }

        let Some(builds) = index.get("builds") else {
            problems.push("Index must have a 'builds' field at the top level".to_string());
            return;
        };
        let Value::Array(builds) = builds else {
            problems.push(format!(
                "'builds' field should be a JSON array, not {}",
                json_type(builds)
            ));
            return;
        };
        if builds.is_empty() {
            problems.push("'builds' is an empty list".to_string());
        }

        for build in builds {
            self.verify_build_json(build, problems);
        }
    }

    pub fn verify_build_json(&self, build: &Value, problems: &mut Vec<String>) {
        let Value::Object(b) = build else {
            problems.push(format!(
                "'builds' should be an array of objects - found {}",
                json_type(build)
            ));
            return;
        };

        match b.get("url") {
            None => problems.push("Build is missing 'url' field".to_string()),
            Some(Value::String(url)) => {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    problems.push("Build URL should start with 'https://' or 'http://'".to_string());
                }
                if url.starts_with("http://") && !b.contains_key("sha512") {
                    problems.push("Build must have 'sha512' field with http:// URL".to_string());
                }
            }
            Some(other) => problems.push(format!(
                "Build 'url' field should be a string, not {}",
                json_type(other)
            )),
        }

        match b.get("sha512") {
            None => {}
            Some(Value::String(hash)) if hash.len() != SHA512_HEX_LEN => {
                let prefix: String = hash.chars().take(8).collect();
                problems.push(format!(
                    "sha512 hashes are {} characters long, but '{}...' is {} characters",
                    SHA512_HEX_LEN,
                    prefix,
                    hash.len()
                ));
            }
            Some(Value::String(_)) => {}
            Some(other) => problems.push(format!(
                "Build 'sha512' field should be a string, not {}",
                json_type(other)
            )),
        }

        match b.get("version") {
            None => problems.push("Build is missing 'version' field".to_string()),
            Some(Value::String(version)) => {
                if !VERSION_DIGITS_RE.is_match(version) {
                    problems.push(format!(
                        "No numeric part found in version string {:?}",
                        version
                    ));
                }
            }
            Some(other) => problems.push(format!(
                "Build 'version' field should be a string, not {}",
                json_type(other)
            )),
        }

        for field in ["kernel", "arch"] {
            match b.get(field) {
                None => {}
                Some(Value::String(value)) if value.is_empty() => problems.push(format!(
                    "Build '{}' field should not be empty. If it doesn't matter, set it to 'any' or omit it",
                    field
                )),
                Some(Value::String(_)) => {}
                Some(other) => problems.push(format!(
                    "Build '{}' field should be a string, not {}",
                    field,
                    json_type(other)
                )),
            }
        }
    }
}

/// Check a top-level string field; `required` fields must be present
fn verify_top_level_string(
    index: &Map<String, Value>,
    field: &str,
    required: bool,
    problems: &mut Vec<String>,
) {
    match index.get(field) {
        Some(Value::String(s)) if s.is_empty() => {
            problems.push(format!("'{}' field must not be empty", field))
        }
        Some(Value::String(_)) => {}
        Some(_) => problems.push(format!("'{}' field should be a string", field)),
        None if required => problems.push(format!(
            "Index must have a '{}' field at the top level",
            field
        )),
        None => problems.push(format!("Index should have a '{}' field", field)),
    }
}
