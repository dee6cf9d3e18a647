// Error types for partitioned artifact storage
//
// Grouped by the failure taxonomy the pipelines rely on: configuration
// errors (bad environment, undeclared keys), validation errors (inputs
// that fail the codecs or the path rules), structural inconsistencies
// (the bucket layout does not match what a writer would produce), and
// pass-through wrappers. All of them fail fast; nothing here retries.

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    // -- configuration --
    #[error("environment variable {var} is not set")]
    MissingEnvVar { var: &'static str },

    #[error("environment variable {var} has unrecognized value '{value}'")]
    InvalidEnvVar { var: &'static str, value: String },

    #[error("partition key '{key}' does not resolve to a value")]
    UnresolvedPartition { key: String },

    #[error("unsupported bucket URL '{url}'")]
    UnsupportedBucket { url: String },

    #[error("unknown partition kind '{value}' (expected text, int, date, or timestamp)")]
    UnknownKind { value: String },

    // -- validation --
    #[error("artifact filename is empty")]
    EmptyFilename,

    #[error("malformed partition segment '{segment}'")]
    MalformedSegment { segment: String },

    #[error("expected partition key '{expected}' in segment '{segment}'")]
    UnexpectedKey { expected: String, segment: String },

    #[error("cannot parse '{value}' for partition key '{key}' as {kind}")]
    ParseValue {
        key: String,
        value: String,
        kind: &'static str,
    },

    #[error("invalid type {found} in column '{column}' for partition serialization")]
    UnsupportedValueType { column: String, found: &'static str },

    #[error("row is missing partition column '{column}'")]
    MissingColumn { column: String },

    #[error("row {index} is not a JSON object")]
    RowNotObject { index: usize },

    #[error("object {path} carries partition {key}={found}, expected {key}={expected}")]
    PartitionMismatch {
        path: String,
        key: String,
        expected: String,
        found: String,
    },

    // -- structural inconsistency --
    #[error("no partition children under {prefix}")]
    NoChildren { prefix: String },

    #[error("found {found} entries rather than one file under {prefix}")]
    LeafCount { prefix: String, found: usize },

    #[error("object {path} has no artifact metadata attribute")]
    MissingMetadata { path: String },

    // -- pass-through --
    #[error("object store error: {0}")]
    Store(#[from] object_store::Error),

    #[error("object path error: {0}")]
    Path(#[from] object_store::path::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ArtifactError>;
