//! Object-store plumbing: bucket URLs, store construction, and the
//! metadata side channel that rides along with every saved artifact.
//!
//! Stores are bucket-scoped, so a bucket URL maps to one store and every
//! path below it is relative to the bucket root. The serialized record is
//! attached to each object as a metadata attribute rather than embedded in
//! the content, which keeps payloads byte-identical to what the upstream
//! source served.

use std::borrow::Cow;
use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;
use object_store::path::Path;
use object_store::{Attribute, AttributeValue, Attributes, GetOptions, ObjectStore, PutOptions};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{ArtifactError, Result};
use crate::partition::{PartitionValue, serialize_partitions};
use crate::record::{PARTITIONED_ARTIFACT_METADATA, PartitionedArtifact};

/// Where a bucket URL points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BucketSpec {
    /// Google Cloud Storage bucket, credentials from the environment.
    Gcs { bucket: String },
    /// Directory on the local filesystem, for development.
    Local { root: String },
    /// Fresh in-memory store, for tests and dry runs.
    Memory,
}

/// Parse a bucket URL: `gs://name`, `file:///dir`, `memory://`, or a bare
/// name (taken as a GCS bucket).
pub fn parse_bucket(url: &str) -> Result<BucketSpec> {
    let unsupported = || ArtifactError::UnsupportedBucket {
        url: url.to_string(),
    };
    if let Some(rest) = url.strip_prefix("gs://") {
        let bucket = rest.trim_end_matches('/');
        if bucket.is_empty() || bucket.contains('/') {
            return Err(unsupported());
        }
        Ok(BucketSpec::Gcs {
            bucket: bucket.to_string(),
        })
    } else if let Some(root) = url.strip_prefix("file://") {
        if root.is_empty() {
            return Err(unsupported());
        }
        Ok(BucketSpec::Local {
            root: root.to_string(),
        })
    } else if url == "memory://" {
        Ok(BucketSpec::Memory)
    } else if !url.is_empty() && !url.contains("://") {
        Ok(BucketSpec::Gcs {
            bucket: url.to_string(),
        })
    } else {
        Err(unsupported())
    }
}

/// Build an object store for a bucket URL.
///
/// Note that `memory://` yields a fresh empty store per call; it exists so
/// commands can be exercised without touching a real bucket.
pub fn build_store(url: &str) -> Result<Arc<dyn ObjectStore>> {
    match parse_bucket(url)? {
        BucketSpec::Gcs { bucket } => {
            diagnostics::log_debug!("Opening GCS bucket {bucket}", bucket: bucket.clone());
            let store = object_store::gcp::GoogleCloudStorageBuilder::from_env()
                .with_bucket_name(bucket)
                .build()?;
            Ok(Arc::new(store))
        }
        BucketSpec::Local { root } => {
            diagnostics::log_debug!("Opening local store at {root}", root: root.clone());
            let store = object_store::local::LocalFileSystem::new_with_prefix(&root)?;
            Ok(Arc::new(store))
        }
        BucketSpec::Memory => Ok(Arc::new(object_store::memory::InMemory::new())),
    }
}

fn metadata_attribute() -> Attribute {
    Attribute::Metadata(Cow::Borrowed(PARTITIONED_ARTIFACT_METADATA))
}

/// Write an artifact's content at its declared path, attaching the JSON
/// serialization of the record as a metadata attribute.
///
/// Requires a store with attribute support (GCS, in-memory); plain local
/// filesystems have nowhere to put the side channel.
pub async fn save_artifact<A>(store: &dyn ObjectStore, artifact: &A, content: Bytes) -> Result<Path>
where
    A: PartitionedArtifact + Serialize,
{
    let path = artifact.object_path()?;
    let record_json = serde_json::to_string(artifact)?;

    let mut attributes = Attributes::new();
    attributes.insert(metadata_attribute(), AttributeValue::from(record_json));
    let opts = PutOptions {
        attributes,
        ..Default::default()
    };

    diagnostics::log_info!("Saving artifact at {path}", path: path.to_string());
    store.put_opts(&path, content.into(), opts).await?;
    Ok(path)
}

/// Read back an object and reconstruct its record from the metadata
/// attribute. An object without the attribute was not written by
/// [`save_artifact`] and is treated as a structural problem.
pub async fn fetch_artifact<A>(store: &dyn ObjectStore, path: &Path) -> Result<(A, Bytes)>
where
    A: DeserializeOwned,
{
    let result = store.get(path).await?;
    let record_json = result
        .attributes
        .get(&metadata_attribute())
        .cloned()
        .ok_or_else(|| ArtifactError::MissingMetadata {
            path: path.to_string(),
        })?;
    let record: A = serde_json::from_str(&record_json)?;
    let content = result.bytes().await?;
    Ok((record, content))
}

/// Reconstruct every record stored under `table` restricted by the given
/// partition filter, in listing order.
///
/// Each object's record comes from its metadata attribute; as a safeguard
/// against hand-moved objects, every reconstructed record must agree with
/// the filter it was found under.
pub async fn fetch_all_in_partition<A>(
    store: &dyn ObjectStore,
    table: &str,
    filter: &[(String, PartitionValue)],
) -> Result<Vec<A>>
where
    A: PartitionedArtifact + DeserializeOwned,
{
    let mut parts = vec![table.to_string()];
    parts.extend(serialize_partitions(filter));
    let prefix = Path::from(parts.join("/"));

    let mut records = Vec::new();
    let mut listing = store.list(Some(&prefix));
    while let Some(meta) = listing.next().await {
        let meta = meta?;
        let options = GetOptions {
            head: true,
            ..Default::default()
        };
        let result = store.get_opts(&meta.location, options).await?;
        let record_json = result
            .attributes
            .get(&metadata_attribute())
            .cloned()
            .ok_or_else(|| ArtifactError::MissingMetadata {
                path: meta.location.to_string(),
            })?;
        let record: A = serde_json::from_str(&record_json)?;

        for (key, expected) in filter {
            let found = record.partition_value(key).ok_or_else(|| {
                ArtifactError::UnresolvedPartition {
                    key: key.clone(),
                }
            })?;
            if found != *expected {
                return Err(ArtifactError::PartitionMismatch {
                    path: meta.location.to_string(),
                    key: key.clone(),
                    expected: expected.render(),
                    found: found.render(),
                });
            }
        }
        records.push(record);
    }
    diagnostics::log_debug!(
        "Fetched {count} records under {prefix}",
        count: records.len(),
        prefix: prefix.to_string()
    );
    Ok(records)
}
