//! The artifact contract: what a record is and where it lives.
//!
//! An artifact kind declares a bucket, a table, an ordered list of
//! partition keys, and a filename. From those the object name is always
//! `table/key1=value1/.../filename` and the full location is that name
//! under the bucket. Nothing else about placement is negotiable, which is
//! what lets the resolver in [`crate::resolve`] walk the layout back.

use object_store::path::Path;

use crate::error::{ArtifactError, Result};
use crate::partition::{PartitionKind, PartitionValue, serialize_partitions};

/// Attribute key under which a saved artifact's JSON record rides along
/// with the object. Readers reconstruct records from this side channel
/// instead of re-parsing paths.
pub const PARTITIONED_ARTIFACT_METADATA: &str = "PARTITIONED_ARTIFACT_METADATA";

/// A record that knows its own storage location.
pub trait PartitionedArtifact {
    /// Destination bucket as a URL (`gs://gtfs-data`, `file:///tmp/x`,
    /// `memory://` in tests).
    fn bucket(&self) -> &str;

    /// Top path component under the bucket.
    fn table(&self) -> &str;

    /// Leaf object name; surrounding whitespace is ignored.
    fn filename(&self) -> &str;

    /// Ordered partition keys. The order matters! It fixes the path layout
    /// and the level order of latest-file resolution.
    fn partition_names() -> &'static [&'static str]
    where
        Self: Sized;

    /// Declared codec per partition key, parallel to [`partition_names`].
    ///
    /// [`partition_names`]: PartitionedArtifact::partition_names
    fn partition_kinds() -> &'static [PartitionKind]
    where
        Self: Sized;

    /// The value for one declared key, or `None` when it does not resolve.
    fn partition_value(&self, name: &str) -> Option<PartitionValue>;

    /// Every declared key with its resolved value, in declaration order.
    ///
    /// A declared key that resolves to nothing is a configuration error;
    /// a kind that cannot produce its own path has no business writing.
    fn partitions(&self) -> Result<Vec<(String, PartitionValue)>>
    where
        Self: Sized,
    {
        Self::partition_names()
            .iter()
            .map(|name| {
                self.partition_value(name)
                    .map(|value| (name.to_string(), value))
                    .ok_or_else(|| ArtifactError::UnresolvedPartition {
                        key: name.to_string(),
                    })
            })
            .collect()
    }

    /// `table/key1=value1/.../filename`, relative to the bucket.
    fn object_name(&self) -> Result<String>
    where
        Self: Sized,
    {
        let filename = self.filename().trim();
        if filename.is_empty() {
            return Err(ArtifactError::EmptyFilename);
        }
        let mut parts = vec![self.table().to_string()];
        parts.extend(serialize_partitions(&self.partitions()?));
        parts.push(filename.to_string());
        Ok(parts.join("/"))
    }

    /// The object-store path for this record.
    fn object_path(&self) -> Result<Path>
    where
        Self: Sized,
    {
        Ok(Path::from(self.object_name()?))
    }

    /// Display form including the bucket, e.g.
    /// `gs://bucket/table/dt=2022-08-17/feed`.
    fn full_uri(&self) -> Result<String>
    where
        Self: Sized,
    {
        Ok(format!(
            "{}/{}",
            self.bucket().trim_end_matches('/'),
            self.object_name()?
        ))
    }
}
