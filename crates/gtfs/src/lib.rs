//! calitp-gtfs: GTFS feed acquisition and inspection.
//!
//! Downloads schedule and realtime feeds described by a download config,
//! records each fetch as a partitioned artifact, and peeks into stored
//! realtime snapshots. Set CALITP_LOG to control logging.

/// Error types for feed handling
pub mod error;

/// Schedule vs. the three realtime feed kinds
pub mod feed_type;

// Outbound HTTP: config, auth substitution, filename derivation.
pub mod download;

/// Partitioned artifact kinds produced by fetches
pub mod extract;

// Minimal GTFS-realtime protobuf surface.
pub mod realtime;

/// YAML secrets with digest verification
pub mod secrets;

pub use error::{GtfsError, Result};
pub use feed_type::FeedType;

pub use download::{
    DownloadConfig, USER_AGENT, base64_url, build_request, decode_base64_url, derive_filename,
    download_feed, http_client,
};
pub use extract::{
    CATALOG_FILENAME, CATALOG_TABLE, CatalogExtract, FeedExtract, RealtimeFeedExtract,
    ScheduleFeedExtract, validate_realtime_config, validate_schedule_config,
};
pub use realtime::{
    FeedMessage, SnapshotPick, SnapshotSummary, fetch_snapshot, fetch_snapshot_bytes, summarize,
};
pub use secrets::{load_secrets, parse_secrets};
