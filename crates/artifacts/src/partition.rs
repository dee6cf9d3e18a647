//! Partition values and their path codecs.
//!
//! Everything stored under a bucket lives at
//! `table/key1=value1/key2=value2/.../filename`, and the values embedded in
//! those segments come from a closed set of types. Each type has exactly one
//! canonical rendering, and parsing is strict: a segment either round-trips
//! through its declared codec or the whole operation fails. Hive-style
//! readers downstream depend on these exact forms, so the renderings here
//! are load-bearing, not cosmetic.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat};
use regex::Regex;

use crate::error::{ArtifactError, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

// Key and value charsets for `key=value` path segments. The value class
// covers every codec output: ISO-8601 offsets (`:`, `+`), dates (`-`),
// dotted filename-ish text, and padded URL-safe base64 (`=`, `-`, `_`).
static KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w+$").expect("static regex"));
static VALUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w\-:=+.]+$").expect("static regex"));

/// A single partition value, tagged with its type.
///
/// Ordering is by natural value order within a variant (timestamps compare
/// as instants, never as strings), which is what the latest-file resolution
/// sorts by.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum PartitionValue {
    Text(String),
    Int(i64),
    Date(NaiveDate),
    Timestamp(DateTime<FixedOffset>),
}

impl PartitionValue {
    /// The canonical path rendering of this value.
    ///
    /// Dates render zero-padded `YYYY-MM-DD`; timestamps render ISO-8601
    /// with an explicit offset (`2022-08-17T14:00:00+00:00`, never `Z`),
    /// keeping sub-second precision only when present.
    pub fn render(&self) -> String {
        match self {
            PartitionValue::Text(s) => s.clone(),
            PartitionValue::Int(i) => i.to_string(),
            PartitionValue::Date(d) => d.format(DATE_FORMAT).to_string(),
            PartitionValue::Timestamp(ts) => ts.to_rfc3339_opts(SecondsFormat::AutoSi, false),
        }
    }

    pub fn kind(&self) -> PartitionKind {
        match self {
            PartitionValue::Text(_) => PartitionKind::Text,
            PartitionValue::Int(_) => PartitionKind::Int,
            PartitionValue::Date(_) => PartitionKind::Date,
            PartitionValue::Timestamp(_) => PartitionKind::Timestamp,
        }
    }

    /// Convert a JSON cell into a partition value, for row publishing.
    ///
    /// Strings and integral numbers are the only supported cell types;
    /// anything else fails at serialization time with the offending type
    /// named, rather than producing a lossy path segment.
    pub fn from_cell(column: &str, cell: &serde_json::Value) -> Result<PartitionValue> {
        let unsupported = |found: &'static str| ArtifactError::UnsupportedValueType {
            column: column.to_string(),
            found,
        };
        match cell {
            serde_json::Value::String(s) => Ok(PartitionValue::Text(s.clone())),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(PartitionValue::Int(i)),
                // u64-range integers exceed the Int codec; floats never fit.
                None if n.is_u64() => Err(unsupported("out-of-range integer")),
                None => Err(unsupported("float")),
            },
            serde_json::Value::Bool(_) => Err(unsupported("bool")),
            serde_json::Value::Null => Err(unsupported("null")),
            serde_json::Value::Array(_) => Err(unsupported("array")),
            serde_json::Value::Object(_) => Err(unsupported("object")),
        }
    }
}

impl fmt::Display for PartitionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// The declared type of a partition level, used wherever a path segment
/// must be decoded back into a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionKind {
    Text,
    Int,
    Date,
    Timestamp,
}

impl PartitionKind {
    pub fn name(&self) -> &'static str {
        match self {
            PartitionKind::Text => "text",
            PartitionKind::Int => "int",
            PartitionKind::Date => "date",
            PartitionKind::Timestamp => "timestamp",
        }
    }

    /// Strict parse of a rendered value back into a [`PartitionValue`].
    ///
    /// `key` is only used for error context. Dates must be canonical
    /// (`2022-8-1` and `2022-08` both fail); timestamps must be full
    /// RFC 3339 with an explicit offset.
    pub fn parse(&self, key: &str, value: &str) -> Result<PartitionValue> {
        let fail = || ArtifactError::ParseValue {
            key: key.to_string(),
            value: value.to_string(),
            kind: self.name(),
        };
        match self {
            PartitionKind::Text => Ok(PartitionValue::Text(value.to_string())),
            PartitionKind::Int => value
                .parse::<i64>()
                .map(PartitionValue::Int)
                .map_err(|_| fail()),
            PartitionKind::Date => {
                let date = NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| fail())?;
                // chrono accepts unpadded fields; insist on the canonical form
                if date.format(DATE_FORMAT).to_string() != value {
                    return Err(fail());
                }
                Ok(PartitionValue::Date(date))
            }
            PartitionKind::Timestamp => DateTime::parse_from_rfc3339(value)
                .map(PartitionValue::Timestamp)
                .map_err(|_| fail()),
        }
    }
}

impl fmt::Display for PartitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PartitionKind {
    type Err = ArtifactError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(PartitionKind::Text),
            "int" => Ok(PartitionKind::Int),
            "date" => Ok(PartitionKind::Date),
            "timestamp" => Ok(PartitionKind::Timestamp),
            other => Err(ArtifactError::UnknownKind {
                value: other.to_string(),
            }),
        }
    }
}

/// Render ordered `(name, value)` pairs as `name=value` path segments.
///
/// The pair order is preserved verbatim; partition order is part of each
/// artifact kind's contract.
pub fn serialize_partitions(pairs: &[(String, PartitionValue)]) -> Vec<String> {
    pairs
        .iter()
        .map(|(name, value)| format!("{}={}", name, value.render()))
        .collect()
}

/// Split one `key=value` path segment, validating both halves' charsets.
///
/// `split_once` keeps everything after the first `=` as the value, so
/// padded base64 values (`base64_url=aHR0cHM...==`) stay whole.
pub fn parse_segment(segment: &str) -> Result<(&str, &str)> {
    let malformed = || ArtifactError::MalformedSegment {
        segment: segment.to_string(),
    };
    let (key, value) = segment.split_once('=').ok_or_else(malformed)?;
    if !KEY_RE.is_match(key) || !VALUE_RE.is_match(value) {
        return Err(malformed());
    }
    Ok((key, value))
}

/// Extract every `key=value` directory segment from a slash-separated path.
///
/// Only directory components count: the final segment is skipped unless the
/// path ends with `/`, so a filename never masquerades as a partition.
/// Segments that are not `key=value` shaped (table names, filenames) are
/// passed over silently.
pub fn partition_map(path: &str) -> BTreeMap<String, String> {
    let dir = match path.rsplit_once('/') {
        Some((dir, _last)) => dir,
        None => return BTreeMap::new(),
    };
    dir.split('/')
        .filter_map(|segment| parse_segment(segment).ok())
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
