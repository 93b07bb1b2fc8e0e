//! Structural validation of raw JSON documents.
//!
//! The checker walks a [`serde_json::Value`] and reports every place where it
//! does not have the shape of a [`Data`](crate::Data) document. It checks
//! shape only: field presence and JSON types, plus the integer ranges the
//! typed records can hold. Timing and ordering are left to [`crate::lint`].

use serde_json::{Map, Value};
use tracing::debug;

use crate::model::{F0Segment, LoudnessSegment};

/// Why a value was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    /// A required field is absent
    Missing,
    /// The value has the wrong JSON type
    WrongType {
        expected: &'static str,
        found: &'static str,
    },
    /// An integer outside what the field can hold
    OutOfRange { found: String, min: u64, max: u64 },
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueKind::Missing => write!(f, "missing required field"),
            IssueKind::WrongType { expected, found } => {
                write!(f, "expected {}, found {}", expected, found)
            }
            IssueKind::OutOfRange { found, min, max } => {
                write!(f, "{} is out of range {}..={}", found, min, max)
            }
        }
    }
}

/// One structural problem, located by a path like `units[0].note.midi`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub path: String,
    pub kind: IssueKind,
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let path = if self.path.is_empty() {
            "(root)"
        } else {
            self.path.as_str()
        };
        write!(f, "{}: {}", path, self.kind)
    }
}

/// Every issue found in one document, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    issues: Vec<Issue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<Issue> {
        self.issues
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", issue)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationReport {}

/// Check that `value` has the shape of a `Data` document
pub fn validate_value(value: &Value) -> ValidationReport {
    let mut checker = Checker::default();
    checker.data(value);
    debug!(issues = checker.issues.len(), "validated document");
    ValidationReport {
        issues: checker.issues,
    }
}

/// Parse `text` as JSON, then validate it. Syntax errors are returned as `Err`.
pub fn validate_str(text: &str) -> Result<ValidationReport, serde_json::Error> {
    let value: Value = serde_json::from_str(text)?;
    Ok(validate_value(&value))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn child(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_owned()
    } else {
        format!("{}.{}", parent, key)
    }
}

#[derive(Default)]
struct Checker {
    issues: Vec<Issue>,
}

impl Checker {
    fn push(&mut self, path: String, kind: IssueKind) {
        self.issues.push(Issue { path, kind });
    }

    fn wrong_type(&mut self, path: String, expected: &'static str, value: &Value) {
        self.push(
            path,
            IssueKind::WrongType {
                expected,
                found: type_name(value),
            },
        );
    }

    /// Look up a required field, recording `Missing` if absent
    fn required<'v>(
        &mut self,
        object: &'v Map<String, Value>,
        parent: &str,
        key: &str,
    ) -> Option<(String, &'v Value)> {
        let path = child(parent, key);
        match object.get(key) {
            Some(value) => Some((path, value)),
            None => {
                self.push(path, IssueKind::Missing);
                None
            }
        }
    }

    fn object<'v>(&mut self, path: &str, value: &'v Value) -> Option<&'v Map<String, Value>> {
        match value {
            Value::Object(map) => Some(map),
            other => {
                self.wrong_type(path.to_owned(), "object", other);
                None
            }
        }
    }

    fn array<'v>(&mut self, path: &str, value: &'v Value) -> Option<&'v [Value]> {
        match value {
            Value::Array(items) => Some(items),
            other => {
                self.wrong_type(path.to_owned(), "array", other);
                None
            }
        }
    }

    fn required_object<'v>(
        &mut self,
        object: &'v Map<String, Value>,
        parent: &str,
        key: &str,
    ) -> Option<(String, &'v Map<String, Value>)> {
        let (path, value) = self.required(object, parent, key)?;
        let map = self.object(&path, value)?;
        Some((path, map))
    }

    fn required_array<'v>(
        &mut self,
        object: &'v Map<String, Value>,
        parent: &str,
        key: &str,
    ) -> Option<(String, &'v [Value])> {
        let (path, value) = self.required(object, parent, key)?;
        let items = self.array(&path, value)?;
        Some((path, items))
    }

    fn required_string(&mut self, object: &Map<String, Value>, parent: &str, key: &str) {
        if let Some((path, value)) = self.required(object, parent, key) {
            if !value.is_string() {
                self.wrong_type(path, "string", value);
            }
        }
    }

    fn required_number(&mut self, object: &Map<String, Value>, parent: &str, key: &str) {
        if let Some((path, value)) = self.required(object, parent, key) {
            if !value.is_number() {
                self.wrong_type(path, "number", value);
            }
        }
    }

    fn required_integer(
        &mut self,
        object: &Map<String, Value>,
        parent: &str,
        key: &str,
        max: u64,
    ) {
        let Some((path, value)) = self.required(object, parent, key) else {
            return;
        };
        match value {
            Value::Number(n) if n.as_u64().is_some_and(|v| v <= max) => {}
            Value::Number(n) if n.is_u64() || n.is_i64() => self.push(
                path,
                IssueKind::OutOfRange {
                    found: n.to_string(),
                    min: 0,
                    max,
                },
            ),
            // Floats, including whole ones like 57.0, do not decode as integers
            Value::Number(_) => self.push(
                path,
                IssueKind::WrongType {
                    expected: "integer",
                    found: "number",
                },
            ),
            other => self.wrong_type(path, "integer", other),
        }
    }

    /// Declared optional fields may be absent or null; otherwise numeric.
    fn optional_numbers(&mut self, object: &Map<String, Value>, parent: &str, keys: &[&str]) {
        for key in keys {
            match object.get(*key) {
                None | Some(Value::Null) | Some(Value::Number(_)) => {}
                Some(other) => self.wrong_type(child(parent, key), "number", other),
            }
        }
    }

    fn data(&mut self, value: &Value) {
        let Some(root) = self.object("", value) else {
            return;
        };
        let Some((path, units)) = self.required_array(root, "", "units") else {
            return;
        };
        for (i, unit) in units.iter().enumerate() {
            self.unit(&format!("{}[{}]", path, i), unit);
        }
    }

    fn unit(&mut self, path: &str, value: &Value) {
        let Some(unit) = self.object(path, value) else {
            return;
        };

        self.required_string(unit, path, "vowel");
        self.track(unit, path, "f0", F0Segment::FIELDS);
        self.track(unit, path, "loudness", LoudnessSegment::FIELDS);

        if let Some((note_path, note)) = self.required_object(unit, path, "note") {
            self.required_integer(note, &note_path, "midi", 127);
            self.required_integer(note, &note_path, "num_tatums", u32::MAX as u64);
            self.required_number(note, &note_path, "tempo");
            self.required_number(note, &note_path, "velocity");
        }
    }

    fn track(&mut self, unit: &Map<String, Value>, parent: &str, key: &str, fields: &[&str]) {
        let Some((track_path, track)) = self.required_object(unit, parent, key) else {
            return;
        };
        let Some((path, segments)) = self.required_array(track, &track_path, "segments") else {
            return;
        };
        for (i, segment) in segments.iter().enumerate() {
            self.segment(&format!("{}[{}]", path, i), segment, fields);
        }
    }

    fn segment(&mut self, path: &str, value: &Value, fields: &[&str]) {
        let Some(segment) = self.object(path, value) else {
            return;
        };
        self.required_string(segment, path, "kind");
        self.required_number(segment, path, "start_time");
        self.required_number(segment, path, "end_time");
        self.optional_numbers(segment, path, fields);
    }
}
