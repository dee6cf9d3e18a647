use std::path::Path;

use anyhow::{Context, Result};
use artifacts::PublishFormat;

use crate::common::{open_bucket, read_jsonl};

/// Group a local JSONL file by partition columns and write one object per
/// partition.
#[allow(clippy::print_stdout)]
pub async fn publish_command(
    bucket: &str,
    table: &str,
    by: &[String],
    compress: bool,
    file: &Path,
) -> Result<()> {
    let store = open_bucket(bucket)?;
    let rows = read_jsonl(file)?;
    let columns: Vec<&str> = by.iter().map(String::as_str).collect();
    let format = if compress {
        PublishFormat::JsonlZst
    } else {
        PublishFormat::Jsonl
    };

    let written = artifacts::save_partitioned_rows(store.as_ref(), table, &columns, &rows, format)
        .await
        .with_context(|| format!("publishing {} rows to {table}", rows.len()))?;

    for path in &written {
        println!("{path}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_publish_to_local_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{\"dt\": \"2022-08-17\", \"trips\": 12}}").unwrap();
        writeln!(file, "{{\"dt\": \"2022-08-18\", \"trips\": 9}}").unwrap();

        let bucket = format!("file://{}", dir.path().display());
        publish_command(
            &bucket,
            "fct_daily_trips",
            &["dt".to_string()],
            false,
            file.path(),
        )
        .await
        .unwrap();

        assert!(
            dir.path()
                .join("fct_daily_trips/dt=2022-08-17/data.jsonl")
                .exists()
        );
        assert!(
            dir.path()
                .join("fct_daily_trips/dt=2022-08-18/data.jsonl")
                .exists()
        );
    }
}
