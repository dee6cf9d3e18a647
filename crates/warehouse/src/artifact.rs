//! Warehouse-side partitioned record kinds.
//!
//! Both kinds share the `dt`/`ts` scheme: one directory per calendar day,
//! one per exact instant beneath it. Table names pass through
//! [`safe_identifier`] at construction so caller-chosen names always form
//! valid path components and warehouse identifiers.

use artifacts::{PartitionKind, PartitionValue, PartitionedArtifact};
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::naming::safe_identifier;

/// One dbt output file (`manifest.json`, `run_results.json`, ...) captured
/// after a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbtArtifact {
    #[serde(skip)]
    bucket: String,
    table: String,
    pub filename: String,
    pub ts: DateTime<FixedOffset>,
}

impl DbtArtifact {
    /// `name` is the dbt output filename; the table is its
    /// identifier-safe form.
    pub fn new(bucket: impl Into<String>, name: &str, ts: DateTime<FixedOffset>) -> DbtArtifact {
        DbtArtifact {
            bucket: bucket.into(),
            table: safe_identifier(name),
            filename: name.to_string(),
            ts,
        }
    }

    pub fn dt(&self) -> NaiveDate {
        self.ts.date_naive()
    }
}

impl PartitionedArtifact for DbtArtifact {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn table(&self) -> &str {
        &self.table
    }

    fn filename(&self) -> &str {
        &self.filename
    }

    fn partition_names() -> &'static [&'static str] {
        &["dt", "ts"]
    }

    fn partition_kinds() -> &'static [PartitionKind] {
        &[PartitionKind::Date, PartitionKind::Timestamp]
    }

    fn partition_value(&self, name: &str) -> Option<PartitionValue> {
        match name {
            "dt" => Some(PartitionValue::Date(self.dt())),
            "ts" => Some(PartitionValue::Timestamp(self.ts)),
            _ => None,
        }
    }
}

/// One published export file for a warehouse table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishArtifact {
    #[serde(skip)]
    bucket: String,
    table: String,
    pub filename: String,
    pub ts: DateTime<FixedOffset>,
}

impl PublishArtifact {
    pub fn new(
        bucket: impl Into<String>,
        dataset: &str,
        table: &str,
        filename: impl Into<String>,
        ts: DateTime<FixedOffset>,
    ) -> PublishArtifact {
        PublishArtifact {
            bucket: bucket.into(),
            table: format!("{}__{}", safe_identifier(dataset), safe_identifier(table)),
            filename: filename.into(),
            ts,
        }
    }

    pub fn dt(&self) -> NaiveDate {
        self.ts.date_naive()
    }
}

impl PartitionedArtifact for PublishArtifact {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn table(&self) -> &str {
        &self.table
    }

    fn filename(&self) -> &str {
        &self.filename
    }

    fn partition_names() -> &'static [&'static str] {
        &["dt", "ts"]
    }

    fn partition_kinds() -> &'static [PartitionKind] {
        &[PartitionKind::Date, PartitionKind::Timestamp]
    }

    fn partition_value(&self, name: &str) -> Option<PartitionValue> {
        match name {
            "dt" => Some(PartitionValue::Date(self.dt())),
            "ts" => Some(PartitionValue::Timestamp(self.ts)),
            _ => None,
        }
    }
}
