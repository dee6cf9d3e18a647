//! Partitioned row publishing.
//!
//! Takes flat JSON rows, groups them by the values of the declared
//! partition columns, and writes one JSON-lines object per group at
//! `table/col1=v1/.../data.jsonl`. Grouping is all-or-nothing: a row with
//! a missing partition column or a cell the codecs cannot express fails
//! the whole call before anything is written.

use std::collections::BTreeMap;

use bytes::Bytes;
use object_store::ObjectStore;
use object_store::path::Path;
use serde_json::Value;

use crate::error::{ArtifactError, Result};
use crate::partition::{PartitionValue, serialize_partitions};

/// On-disk format of each published group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishFormat {
    Jsonl,
    /// zstd-compressed JSON lines.
    JsonlZst,
}

impl PublishFormat {
    pub fn filename(&self) -> &'static str {
        match self {
            PublishFormat::Jsonl => "data.jsonl",
            PublishFormat::JsonlZst => "data.jsonl.zst",
        }
    }
}

/// Group `rows` by `partition_columns` and write one object per group.
///
/// Rows keep all their columns, including the partition columns. Returns
/// the written paths; groups are written in sorted partition order, so the
/// result is deterministic for a given input.
pub async fn save_partitioned_rows(
    store: &dyn ObjectStore,
    table: &str,
    partition_columns: &[&str],
    rows: &[Value],
    format: PublishFormat,
) -> Result<Vec<Path>> {
    let mut groups: BTreeMap<Vec<(String, PartitionValue)>, Vec<&Value>> = BTreeMap::new();

    for (index, row) in rows.iter().enumerate() {
        let object = row
            .as_object()
            .ok_or(ArtifactError::RowNotObject { index })?;
        let mut key = Vec::with_capacity(partition_columns.len());
        for column in partition_columns {
            let cell = object
                .get(*column)
                .ok_or_else(|| ArtifactError::MissingColumn {
                    column: (*column).to_string(),
                })?;
            key.push(((*column).to_string(), PartitionValue::from_cell(column, cell)?));
        }
        groups.entry(key).or_default().push(row);
    }

    let mut written = Vec::with_capacity(groups.len());
    for (key, group_rows) in &groups {
        let mut parts = vec![table.to_string()];
        parts.extend(serialize_partitions(key));
        parts.push(format.filename().to_string());
        let path = Path::from(parts.join("/"));

        let mut body = Vec::new();
        for row in group_rows {
            serde_json::to_writer(&mut body, row)?;
            body.push(b'\n');
        }
        let payload = match format {
            PublishFormat::Jsonl => body,
            PublishFormat::JsonlZst => zstd::encode_all(&body[..], 3)?,
        };

        diagnostics::log_info!(
            "Publishing {rows} rows to {path}",
            rows: group_rows.len(),
            path: path.to_string()
        );
        store.put(&path, Bytes::from(payload).into()).await?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;
    use serde_json::json;

    fn sample_rows() -> Vec<Value> {
        vec![
            json!({"dt": "2022-08-17", "route": "1", "riders": 10}),
            json!({"dt": "2022-08-17", "route": "2", "riders": 20}),
            json!({"dt": "2022-08-18", "route": "1", "riders": 5}),
        ]
    }

    #[tokio::test]
    async fn test_rows_grouped_by_partition_columns() {
        let store = InMemory::new();
        let written = save_partitioned_rows(
            &store,
            "ridership",
            &["dt"],
            &sample_rows(),
            PublishFormat::Jsonl,
        )
        .await
        .unwrap();

        assert_eq!(
            written.iter().map(|p| p.to_string()).collect::<Vec<_>>(),
            vec![
                "ridership/dt=2022-08-17/data.jsonl",
                "ridership/dt=2022-08-18/data.jsonl",
            ]
        );

        let first = store.get(&written[0]).await.unwrap().bytes().await.unwrap();
        let lines: Vec<&str> = std::str::from_utf8(&first)
            .unwrap()
            .lines()
            .collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"route\":\"1\""));
    }

    #[tokio::test]
    async fn test_multi_column_grouping_renders_in_order() {
        let store = InMemory::new();
        let rows = vec![json!({"dt": "2022-08-17", "region": "north", "v": 1})];
        let written = save_partitioned_rows(
            &store,
            "t",
            &["dt", "region"],
            &rows,
            PublishFormat::Jsonl,
        )
        .await
        .unwrap();
        assert_eq!(
            written[0].to_string(),
            "t/dt=2022-08-17/region=north/data.jsonl"
        );
    }

    #[tokio::test]
    async fn test_compressed_rows_round_trip() {
        let store = InMemory::new();
        let written = save_partitioned_rows(
            &store,
            "ridership",
            &["dt"],
            &sample_rows(),
            PublishFormat::JsonlZst,
        )
        .await
        .unwrap();
        assert!(written[0].to_string().ends_with("data.jsonl.zst"));

        let bytes = store.get(&written[0]).await.unwrap().bytes().await.unwrap();
        let decoded = zstd::decode_all(&bytes[..]).unwrap();
        assert_eq!(std::str::from_utf8(&decoded).unwrap().lines().count(), 2);
    }

    #[tokio::test]
    async fn test_unsupported_cell_type_fails_before_writing() {
        let store = InMemory::new();
        let rows = vec![
            json!({"dt": "2022-08-17", "v": 1}),
            json!({"dt": 3.5, "v": 2}),
        ];
        match save_partitioned_rows(&store, "t", &["dt"], &rows, PublishFormat::Jsonl).await {
            Err(ArtifactError::UnsupportedValueType { column, found }) => {
                assert_eq!(column, "dt");
                assert_eq!(found, "float");
            }
            other => panic!("expected unsupported type error, got {other:?}"),
        }

        // Nothing was written for the valid row either.
        let listing: Vec<_> = futures::StreamExt::collect::<Vec<_>>(store.list(None)).await;
        assert!(listing.is_empty());
    }

    #[tokio::test]
    async fn test_missing_partition_column_errors() {
        let store = InMemory::new();
        let rows = vec![json!({"other": 1})];
        match save_partitioned_rows(&store, "t", &["dt"], &rows, PublishFormat::Jsonl).await {
            Err(ArtifactError::MissingColumn { column }) => assert_eq!(column, "dt"),
            other => panic!("expected missing column error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_object_row_errors() {
        let store = InMemory::new();
        let rows = vec![json!([1, 2, 3])];
        match save_partitioned_rows(&store, "t", &["dt"], &rows, PublishFormat::Jsonl).await {
            Err(ArtifactError::RowNotObject { index }) => assert_eq!(index, 0),
            other => panic!("expected row shape error, got {other:?}"),
        }
    }
}
