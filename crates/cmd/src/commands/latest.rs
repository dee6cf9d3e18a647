use anyhow::{Context, Result};
use artifacts::serialize_partitions;

use crate::common::{open_bucket, parse_partition_spec};

/// Resolve the newest leaf under a table by walking its partition levels.
#[allow(clippy::print_stdout)]
pub async fn latest_command(bucket: &str, table: &str, partitions: &[String]) -> Result<()> {
    let store = open_bucket(bucket)?;
    let specs = partitions
        .iter()
        .map(|spec| parse_partition_spec(spec))
        .collect::<Result<Vec<_>>>()?;
    let levels: Vec<(&str, artifacts::PartitionKind)> = specs
        .iter()
        .map(|(name, kind)| (name.as_str(), *kind))
        .collect();

    let leaf = artifacts::latest_leaf(store.as_ref(), table, &levels)
        .await
        .with_context(|| format!("resolving latest under {table}"))?;

    println!("{}", leaf.path);
    for segment in serialize_partitions(&leaf.partitions) {
        println!("  {segment}");
    }
    Ok(())
}
