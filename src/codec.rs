//! JSON reading and writing.
//!
//! Decoding is two-pass: the text is parsed into a generic JSON value, the
//! value is checked with [`validate_value`], and only a structurally valid
//! value is converted into typed records. A bad document therefore reports
//! every problem at once instead of the first field serde trips over.

use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use serde_json::Value;
use tracing::{debug, trace};

use crate::lint::{lint, Finding, LintConfig};
use crate::model::Data;
use crate::validate::{validate_value, ValidationReport};

/// Errors from reading or writing documents
#[derive(Debug)]
pub enum CodecError {
    /// Reading or writing the underlying stream failed
    Io(std::io::Error),
    /// Not well-formed JSON, or encoding failed
    Json(serde_json::Error),
    /// Well-formed JSON with the wrong shape
    Invalid(ValidationReport),
    /// Typed conversion failed after the shape check passed
    Decode(serde_json::Error),
    /// Values with no JSON form that decodes back: NaN or infinite
    /// numbers, MIDI notes above 127, extras shadowing declared fields
    Unencodable(Vec<Finding>),
}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecError::Io(err) => write!(f, "I/O error: {}", err),
            CodecError::Json(err) => write!(f, "JSON error: {}", err),
            CodecError::Invalid(report) => {
                write!(f, "invalid document ({} issues):\n{}", report.len(), report)
            }
            CodecError::Decode(err) => write!(f, "cannot decode document: {}", err),
            CodecError::Unencodable(findings) => {
                write!(f, "cannot encode document ({} problems):", findings.len())?;
                for finding in findings {
                    write!(f, "\n{}", finding)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CodecError::Io(err) => Some(err),
            CodecError::Json(err) | CodecError::Decode(err) => Some(err),
            CodecError::Invalid(report) => Some(report),
            CodecError::Unencodable(_) => None,
        }
    }
}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        CodecError::Io(err)
    }
}

/// Validate and convert an already-parsed JSON value
pub fn from_value(value: Value) -> Result<Data, CodecError> {
    let report = validate_value(&value);
    if !report.is_valid() {
        debug!(issues = report.len(), "rejecting document");
        return Err(CodecError::Invalid(report));
    }
    let data: Data = serde_json::from_value(value).map_err(CodecError::Decode)?;
    debug!(units = data.len(), "decoded document");
    Ok(data)
}

pub fn from_str(text: &str) -> Result<Data, CodecError> {
    trace!(bytes = text.len(), "parsing document");
    let value: Value = serde_json::from_str(text).map_err(CodecError::Json)?;
    from_value(value)
}

pub fn from_slice(bytes: &[u8]) -> Result<Data, CodecError> {
    trace!(bytes = bytes.len(), "parsing document");
    let value: Value = serde_json::from_slice(bytes).map_err(CodecError::Json)?;
    from_value(value)
}

pub fn from_reader(mut reader: impl Read) -> Result<Data, CodecError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    from_slice(&bytes)
}

pub fn from_path(path: impl AsRef<Path>) -> Result<Data, CodecError> {
    let path = path.as_ref();
    debug!(path = %path.display(), "reading document");
    let bytes = fs::read(path)?;
    from_slice(&bytes)
}

/// Refuse documents whose encoding the decoder would reject or misread.
/// serde_json writes NaN as `null`, and flattened extras can repeat a key.
fn ensure_encodable(data: &Data) -> Result<(), CodecError> {
    let findings = lint(data, &LintConfig::encodable());
    if findings.is_empty() {
        Ok(())
    } else {
        debug!(problems = findings.len(), "refusing to encode document");
        Err(CodecError::Unencodable(findings))
    }
}

/// Compact encoding. Absent optional fields are omitted.
pub fn to_string(data: &Data) -> Result<String, CodecError> {
    ensure_encodable(data)?;
    serde_json::to_string(data).map_err(CodecError::Json)
}

pub fn to_string_pretty(data: &Data) -> Result<String, CodecError> {
    ensure_encodable(data)?;
    serde_json::to_string_pretty(data).map_err(CodecError::Json)
}

/// Nothing is written if the document is unencodable
pub fn to_writer(mut writer: impl Write, data: &Data, pretty: bool) -> Result<(), CodecError> {
    ensure_encodable(data)?;
    let result = if pretty {
        serde_json::to_writer_pretty(&mut writer, data)
    } else {
        serde_json::to_writer(&mut writer, data)
    };
    result.map_err(CodecError::Json)?;
    writer.flush()?;
    Ok(())
}

/// Write pretty JSON followed by a newline, replacing the file
pub fn to_path(path: impl AsRef<Path>, data: &Data) -> Result<(), CodecError> {
    let path = path.as_ref();
    let mut text = to_string_pretty(data)?;
    text.push('\n');
    fs::write(path, text)?;
    debug!(path = %path.display(), units = data.len(), "wrote document");
    Ok(())
}
