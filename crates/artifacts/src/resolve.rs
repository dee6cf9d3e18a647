//! Latest-file resolution over a partitioned table.
//!
//! Walks the partition hierarchy one level at a time: list the immediate
//! children of the current prefix, decode each child's trailing
//! `key=value` segment with the declared codec, take the greatest decoded
//! value, descend. Sorting happens on decoded values, never on raw
//! strings, so `hour=2022-08-17T07:00:00-08:00` beats
//! `hour=2022-08-17T14:00:00+00:00` (it is the later instant).
//!
//! The walk is strict. An undecodable child, a child keyed by the wrong
//! name, or an empty level fails the whole resolution; a writer that
//! follows [`crate::record::PartitionedArtifact`] can never produce such a
//! layout, so encountering one means the table has been tampered with or
//! the declared scheme is wrong. The fully-resolved prefix must hold
//! exactly one file.

use object_store::ObjectStore;
use object_store::path::Path;

use crate::error::{ArtifactError, Result};
use crate::partition::{PartitionKind, PartitionValue, parse_segment};
use crate::record::PartitionedArtifact;

/// The outcome of a successful resolution: the leaf object plus the
/// decoded partition values along the chosen branch, in level order.
#[derive(Debug, Clone)]
pub struct LatestLeaf {
    pub path: Path,
    pub partitions: Vec<(String, PartitionValue)>,
}

/// Resolve the newest leaf under `table`, descending through `levels` in
/// declaration order.
pub async fn latest_leaf(
    store: &dyn ObjectStore,
    table: &str,
    levels: &[(&str, PartitionKind)],
) -> Result<LatestLeaf> {
    let mut prefix = Path::from(table);
    let mut partitions = Vec::with_capacity(levels.len());

    for (name, kind) in levels {
        let listing = store.list_with_delimiter(Some(&prefix)).await?;

        let mut children: Vec<(PartitionValue, Path)> = Vec::new();
        for child in listing.common_prefixes {
            let segment = child
                .filename()
                .ok_or_else(|| ArtifactError::MalformedSegment {
                    segment: child.to_string(),
                })?;
            let (key, raw) = parse_segment(segment)?;
            if key != *name {
                return Err(ArtifactError::UnexpectedKey {
                    expected: (*name).to_string(),
                    segment: segment.to_string(),
                });
            }
            children.push((kind.parse(name, raw)?, child));
        }

        if children.is_empty() {
            return Err(ArtifactError::NoChildren {
                prefix: prefix.to_string(),
            });
        }

        // Stable sort: ties keep the store's lexical listing order.
        children.sort_by(|a, b| b.0.cmp(&a.0));
        let (value, child) = children.swap_remove(0);
        diagnostics::log_debug!(
            "Descending into {name}={value}",
            name: *name,
            value: value.render()
        );
        partitions.push(((*name).to_string(), value));
        prefix = child;
    }

    let listing = store.list_with_delimiter(Some(&prefix)).await?;
    let entries = listing.objects.len() + listing.common_prefixes.len();
    if listing.objects.len() != 1 || !listing.common_prefixes.is_empty() {
        return Err(ArtifactError::LeafCount {
            prefix: prefix.to_string(),
            found: entries,
        });
    }
    let leaf = listing.objects.into_iter().next().ok_or_else(|| {
        ArtifactError::LeafCount {
            prefix: prefix.to_string(),
            found: 0,
        }
    })?;

    diagnostics::log_info!("Resolved latest leaf {path}", path: leaf.location.to_string());
    Ok(LatestLeaf {
        path: leaf.location,
        partitions,
    })
}

/// [`latest_leaf`] with the levels taken from an artifact kind's declared
/// partition scheme. The table is still explicit because some kinds store
/// under a per-instance table (one table per realtime feed type).
pub async fn latest_for<A>(store: &dyn ObjectStore, table: &str) -> Result<LatestLeaf>
where
    A: PartitionedArtifact,
{
    let names = A::partition_names();
    let kinds = A::partition_kinds();
    let levels: Vec<(&str, PartitionKind)> = names
        .iter()
        .copied()
        .zip(kinds.iter().copied())
        .collect();
    latest_leaf(store, table, &levels).await
}
