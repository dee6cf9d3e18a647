//! Helpers shared across subcommands.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use artifacts::PartitionKind;
use chrono::NaiveDate;
use object_store::ObjectStore;
use serde_json::Value;

/// Open the object store behind a bucket URL or bare bucket name.
pub fn open_bucket(bucket: &str) -> Result<Arc<dyn ObjectStore>> {
    artifacts::build_store(bucket).with_context(|| format!("opening bucket {bucket}"))
}

/// Parse a `name:kind` partition declaration, e.g. `dt:date` or
/// `ts:timestamp`.
pub fn parse_partition_spec(spec: &str) -> Result<(String, PartitionKind)> {
    let (name, kind) = spec
        .split_once(':')
        .ok_or_else(|| anyhow!("partition spec '{spec}' is not of the form name:kind"))?;
    let kind: PartitionKind = kind
        .parse()
        .with_context(|| format!("in partition spec '{spec}'"))?;
    Ok((name.to_string(), kind))
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("parsing date '{s}'"))
}

/// Read a JSON-lines file into row values, skipping blank lines.
pub fn read_jsonl(path: &Path) -> Result<Vec<Value>> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let mut rows = Vec::new();
    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let row: Value = serde_json::from_str(line)
            .with_context(|| format!("{}:{}: invalid JSON", path.display(), index + 1))?;
        rows.push(row);
    }
    Ok(rows)
}
