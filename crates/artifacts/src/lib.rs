//! calitp-artifacts - typed partitioned storage for transit pipeline data
//!
//! Every raw artifact the pipelines keep (feed downloads, catalog
//! snapshots, dbt manifests) lives in an object-store bucket at a path of
//! the form `table/key1=value1/key2=value2/.../filename`, with the
//! record that produced it riding along as a metadata attribute. This
//! crate owns that contract: the value codecs, the path builder, the
//! latest-file resolver, and the store plumbing.
//!
//! Set CALITP_LOG to control logging (off by default).

/// Partition value types and their strict path codecs
pub mod partition;

/// The artifact trait: bucket/table/partitions/filename
pub mod record;

/// Latest-file resolution by descending partition walk
pub mod resolve;

/// Store construction and the metadata side channel
pub mod store;

/// Environment and bucket configuration
pub mod config;

/// Grouped JSON-lines publishing
pub mod publish;

// Error types
pub mod error;

// Re-export key types
pub use config::Environment;
pub use error::{ArtifactError, Result};
pub use partition::{PartitionKind, PartitionValue, partition_map, serialize_partitions};
pub use publish::{PublishFormat, save_partitioned_rows};
pub use record::{PARTITIONED_ARTIFACT_METADATA, PartitionedArtifact};
pub use resolve::{LatestLeaf, latest_for, latest_leaf};
pub use store::{
    BucketSpec, build_store, fetch_all_in_partition, fetch_artifact, parse_bucket, save_artifact,
};
