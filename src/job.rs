use serde_json::{Map, Value};
use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Where in the job document a structural problem was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Document,
    /// Zero-based index into `segments`.
    Segment(usize),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Document => write!(f, "job document"),
            Location::Segment(index) => write!(f, "segment {index}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },
    #[error("failed to read config file '{}'", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed JSON document")]
    Malformed(#[from] serde_json::Error),
    #[error("{at}: missing required field '{field}'")]
    MissingField { field: &'static str, at: Location },
    #[error("{at}: '{field}' must be {expected}")]
    InvalidType {
        field: &'static str,
        expected: &'static str,
        at: Location,
    },
    #[error("'segments' cannot be empty")]
    EmptySegments,
}

/// Destination of a cut as written in the job document.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputSpec {
    Path(PathBuf),
    /// A non-string JSON value, kept as its JSON text.
    NotAPath(String),
}

impl OutputSpec {
    pub fn path(&self) -> Option<&Path> {
        match self {
            OutputSpec::Path(path) => Some(path),
            OutputSpec::NotAPath(_) => None,
        }
    }
}

impl fmt::Display for OutputSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputSpec::Path(path) => write!(f, "{}", path.display()),
            OutputSpec::NotAPath(raw) => f.write_str(raw),
        }
    }
}

/// One requested cut. `start`, `end` and `output` are kept as written; they
/// are checked when the segment is processed.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentSpec {
    pub start: String,
    pub end: String,
    pub output: OutputSpec,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobConfig {
    pub source: PathBuf,
    pub segments: Vec<SegmentSpec>,
}

impl JobConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let contents = fs::read(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let document: Value = serde_json::from_slice(&contents)?;
        let job = Self::from_document(&document)?;
        tracing::debug!(
            config = %path.display(),
            segments = job.segments.len(),
            "loaded job config"
        );
        Ok(job)
    }

    /// Parse and validate a job document. Every segment is checked before
    /// this returns, so a bad entry anywhere fails the whole job.
    pub fn from_json_str(contents: &str) -> Result<Self, ConfigError> {
        let document: Value = serde_json::from_str(contents)?;
        Self::from_document(&document)
    }

    fn from_document(document: &Value) -> Result<Self, ConfigError> {
        let root = document.as_object().ok_or(ConfigError::InvalidType {
            field: "(root)",
            expected: "an object",
            at: Location::Document,
        })?;

        let source = require(root, "source", Location::Document)?;
        let segments = require(root, "segments", Location::Document)?;

        let source = source.as_str().ok_or(ConfigError::InvalidType {
            field: "source",
            expected: "a string",
            at: Location::Document,
        })?;
        let entries = segments.as_array().ok_or(ConfigError::InvalidType {
            field: "segments",
            expected: "an array",
            at: Location::Document,
        })?;
        if entries.is_empty() {
            return Err(ConfigError::EmptySegments);
        }

        let segments = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| SegmentSpec::from_value(index, entry))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(JobConfig {
            source: PathBuf::from(source),
            segments,
        })
    }
}

impl SegmentSpec {
    fn from_value(index: usize, entry: &Value) -> Result<Self, ConfigError> {
        let at = Location::Segment(index);
        let fields = entry.as_object().ok_or(ConfigError::InvalidType {
            field: "segment",
            expected: "an object",
            at,
        })?;

        let start = require(fields, "start", at)?;
        let end = require(fields, "end", at)?;
        let output = match require(fields, "output", at)? {
            Value::String(path) => OutputSpec::Path(PathBuf::from(path)),
            other => OutputSpec::NotAPath(other.to_string()),
        };

        Ok(SegmentSpec {
            start: notation_text(start),
            end: notation_text(end),
            output,
        })
    }
}

fn require<'a>(
    fields: &'a Map<String, Value>,
    field: &'static str,
    at: Location,
) -> Result<&'a Value, ConfigError> {
    fields
        .get(field)
        .ok_or(ConfigError::MissingField { field, at })
}

/// Strings are taken as-is and numbers by their decimal text. Anything else
/// keeps its JSON text and will fail time parsing for that segment only.
fn notation_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        other => other.to_string(),
    }
}
