// Error types for GTFS feed handling

#[derive(Debug, thiserror::Error)]
pub enum GtfsError {
    #[error("unknown feed type '{value}'")]
    UnknownFeedType { value: String },

    #[error("feed type '{feed_type}' has no realtime snapshots")]
    NotRealtime { feed_type: String },

    #[error("a {expected} extract must come from a {expected} config, got '{found}'")]
    MismatchedFeedType {
        expected: &'static str,
        found: String,
    },

    #[error("auth references undefined secret '{key}'")]
    MissingSecret { key: String },

    #[error("Data corruption detected for secret '{name}': expected {expected}, got {actual}")]
    SecretIntegrity {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("invalid feed URL '{url}'")]
    InvalidUrl { url: String },

    #[error("'{value}' is not a base64-encoded URL")]
    InvalidEncodedUrl { value: String },

    #[error("catalog snapshot at {path} is malformed")]
    MalformedCatalog { path: String },

    #[error("no realtime snapshots under {prefix}")]
    NoSnapshots { prefix: String },

    #[error("artifact error: {0}")]
    Artifact(#[from] artifacts::ArtifactError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("object store error: {0}")]
    Store(#[from] object_store::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("protobuf decode error: {0}")]
    Proto(#[from] prost::DecodeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GtfsError>;
