//! Extract record kinds and their canonical partition schemes.
//!
//! Each kind declares exactly one partition scheme:
//!
//! - catalog snapshots: `dt`, `ts`
//! - schedule feeds: `dt`, `base64_url`, `ts` (URL before timestamp, since
//!   many feeds share one tick)
//! - realtime feeds: `dt`, `hour`, `ts`, `base64_url` (the hour level keeps
//!   per-hour pruning cheap at realtime volumes)
//!
//! `dt` is always the date of `ts` and `hour` is `ts` truncated to the
//! hour, so a record pins down its own location completely.

use std::collections::BTreeMap;

use artifacts::{PartitionKind, PartitionValue, PartitionedArtifact};
use chrono::{DateTime, FixedOffset, NaiveDate, Timelike, Utc};
use object_store::ObjectStore;
use serde::{Deserialize, Serialize};

use crate::download::DownloadConfig;
use crate::error::{GtfsError, Result};
use crate::feed_type::FeedType;

fn truncate_to_hour(ts: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    ts.with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(ts)
}

/// A schedule extract must come from a schedule config.
pub fn validate_schedule_config(config: &DownloadConfig) -> Result<()> {
    if config.feed_type != FeedType::Schedule {
        return Err(GtfsError::MismatchedFeedType {
            expected: "schedule",
            found: config.feed_type.to_string(),
        });
    }
    Ok(())
}

/// A realtime extract must come from a realtime config.
pub fn validate_realtime_config(config: &DownloadConfig) -> Result<()> {
    if !config.feed_type.is_realtime() {
        return Err(GtfsError::MismatchedFeedType {
            expected: "realtime",
            found: config.feed_type.to_string(),
        });
    }
    Ok(())
}

/// A downloaded static schedule feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleFeedExtract {
    /// Destination bucket; not part of the metadata side channel.
    #[serde(skip)]
    pub bucket: String,
    pub filename: String,
    pub ts: DateTime<FixedOffset>,
    pub config: DownloadConfig,
    pub response_code: u16,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub response_headers: BTreeMap<String, String>,
}

impl ScheduleFeedExtract {
    pub fn new(
        bucket: String,
        filename: String,
        ts: DateTime<FixedOffset>,
        config: DownloadConfig,
        response_code: u16,
        response_headers: BTreeMap<String, String>,
    ) -> Result<Self> {
        validate_schedule_config(&config)?;
        Ok(ScheduleFeedExtract {
            bucket,
            filename,
            ts,
            config,
            response_code,
            response_headers,
        })
    }

    pub fn dt(&self) -> NaiveDate {
        self.ts.date_naive()
    }
}

impl PartitionedArtifact for ScheduleFeedExtract {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn table(&self) -> &str {
        FeedType::Schedule.as_str()
    }

    fn filename(&self) -> &str {
        &self.filename
    }

    fn partition_names() -> &'static [&'static str] {
        &["dt", "base64_url", "ts"]
    }

    fn partition_kinds() -> &'static [PartitionKind] {
        &[
            PartitionKind::Date,
            PartitionKind::Text,
            PartitionKind::Timestamp,
        ]
    }

    fn partition_value(&self, name: &str) -> Option<PartitionValue> {
        match name {
            "dt" => Some(PartitionValue::Date(self.dt())),
            "base64_url" => Some(PartitionValue::Text(self.config.base64_url())),
            "ts" => Some(PartitionValue::Timestamp(self.ts)),
            _ => None,
        }
    }
}

/// A downloaded realtime feed snapshot (service alerts, trip updates, or
/// vehicle positions). The table is the feed type itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealtimeFeedExtract {
    /// Destination bucket; not part of the metadata side channel.
    #[serde(skip)]
    pub bucket: String,
    pub filename: String,
    pub ts: DateTime<FixedOffset>,
    pub config: DownloadConfig,
    pub response_code: u16,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub response_headers: BTreeMap<String, String>,
}

impl RealtimeFeedExtract {
    pub fn new(
        bucket: String,
        filename: String,
        ts: DateTime<FixedOffset>,
        config: DownloadConfig,
        response_code: u16,
        response_headers: BTreeMap<String, String>,
    ) -> Result<Self> {
        validate_realtime_config(&config)?;
        Ok(RealtimeFeedExtract {
            bucket,
            filename,
            ts,
            config,
            response_code,
            response_headers,
        })
    }

    pub fn feed_type(&self) -> FeedType {
        self.config.feed_type
    }

    pub fn dt(&self) -> NaiveDate {
        self.ts.date_naive()
    }

    pub fn hour(&self) -> DateTime<FixedOffset> {
        truncate_to_hour(self.ts)
    }

    /// Filename tagged with the capture time, for batch validation runs
    /// that download many snapshots side by side.
    pub fn timestamped_filename(&self) -> String {
        format!(
            "{}{}",
            self.filename,
            self.ts.with_timezone(&Utc).format("__%Y-%m-%dT%H:%M:%SZ")
        )
    }
}

impl PartitionedArtifact for RealtimeFeedExtract {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn table(&self) -> &str {
        self.config.feed_type.as_str()
    }

    fn filename(&self) -> &str {
        &self.filename
    }

    fn partition_names() -> &'static [&'static str] {
        &["dt", "hour", "ts", "base64_url"]
    }

    fn partition_kinds() -> &'static [PartitionKind] {
        &[
            PartitionKind::Date,
            PartitionKind::Timestamp,
            PartitionKind::Timestamp,
            PartitionKind::Text,
        ]
    }

    fn partition_value(&self, name: &str) -> Option<PartitionValue> {
        match name {
            "dt" => Some(PartitionValue::Date(self.dt())),
            "hour" => Some(PartitionValue::Timestamp(self.hour())),
            "ts" => Some(PartitionValue::Timestamp(self.ts)),
            "base64_url" => Some(PartitionValue::Text(self.config.base64_url())),
            _ => None,
        }
    }
}

/// A downloaded feed, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FeedExtract {
    Schedule(ScheduleFeedExtract),
    Realtime(RealtimeFeedExtract),
}

impl FeedExtract {
    pub fn filename(&self) -> &str {
        match self {
            FeedExtract::Schedule(e) => &e.filename,
            FeedExtract::Realtime(e) => &e.filename,
        }
    }

    pub fn ts(&self) -> DateTime<FixedOffset> {
        match self {
            FeedExtract::Schedule(e) => e.ts,
            FeedExtract::Realtime(e) => e.ts,
        }
    }

    pub fn object_name(&self) -> Result<String> {
        let name = match self {
            FeedExtract::Schedule(e) => e.object_name()?,
            FeedExtract::Realtime(e) => e.object_name()?,
        };
        Ok(name)
    }
}

/// The table every catalog snapshot lands in.
pub const CATALOG_TABLE: &str = "california_transit__gtfs_datasets";

/// The filename the canonical catalog writer uses.
pub const CATALOG_FILENAME: &str = "configs.jsonl.zst";

/// A snapshot of the download-config catalog: zstd-compressed JSON lines
/// of [`DownloadConfig`] rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogExtract {
    /// Destination bucket; not part of the metadata side channel.
    #[serde(skip)]
    pub bucket: String,
    pub filename: String,
    pub ts: DateTime<FixedOffset>,
    /// The catalog rows themselves ride in the object content, not in the
    /// metadata side channel.
    #[serde(skip)]
    pub records: Vec<DownloadConfig>,
}

impl CatalogExtract {
    pub fn new(
        bucket: String,
        ts: DateTime<FixedOffset>,
        records: Vec<DownloadConfig>,
    ) -> CatalogExtract {
        CatalogExtract {
            bucket,
            filename: CATALOG_FILENAME.to_string(),
            ts,
            records,
        }
    }

    pub fn dt(&self) -> NaiveDate {
        self.ts.date_naive()
    }

    /// Serialize the rows as zstd-compressed JSON lines.
    pub fn encode_records(&self) -> Result<Vec<u8>> {
        let mut body = Vec::new();
        for record in &self.records {
            serde_json::to_writer(&mut body, record)?;
            body.push(b'\n');
        }
        Ok(zstd::encode_all(&body[..], 3)?)
    }

    /// Resolve and load the most recent catalog snapshot in the store.
    pub async fn latest(store: &dyn ObjectStore, bucket: &str) -> Result<CatalogExtract> {
        let leaf = artifacts::latest_for::<CatalogExtract>(store, CATALOG_TABLE).await?;
        let malformed = || GtfsError::MalformedCatalog {
            path: leaf.path.to_string(),
        };

        let ts = leaf
            .partitions
            .iter()
            .find_map(|(name, value)| match (name.as_str(), value) {
                ("ts", PartitionValue::Timestamp(t)) => Some(*t),
                _ => None,
            })
            .ok_or_else(malformed)?;

        let bytes = store.get(&leaf.path).await?.bytes().await?;
        let body = zstd::decode_all(&bytes[..])?;
        let text = String::from_utf8(body).map_err(|_| malformed())?;
        let mut records = Vec::new();
        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            records.push(serde_json::from_str::<DownloadConfig>(line)?);
        }

        let filename = leaf.path.filename().ok_or_else(malformed)?.to_string();
        diagnostics::log_info!(
            "Loaded {count} download configs from {path}",
            count: records.len(),
            path: leaf.path.to_string()
        );
        Ok(CatalogExtract {
            bucket: bucket.to_string(),
            filename,
            ts,
            records,
        })
    }
}

impl PartitionedArtifact for CatalogExtract {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn table(&self) -> &str {
        CATALOG_TABLE
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

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use object_store::memory::InMemory;

    fn ts(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn rt_config() -> DownloadConfig {
        DownloadConfig {
            name: "Example RT".to_string(),
            url: "https://ridemvgo.org/gtfs".to_string(),
            feed_type: FeedType::VehiclePositions,
            auth_query_params: BTreeMap::new(),
            auth_headers: BTreeMap::new(),
        }
    }

    fn schedule_config() -> DownloadConfig {
        DownloadConfig {
            feed_type: FeedType::Schedule,
            ..rt_config()
        }
    }

    #[test]
    fn test_realtime_extract_path() {
        let extract = RealtimeFeedExtract::new(
            "gs://test-rt".to_string(),
            "feed".to_string(),
            ts("2022-08-17T14:26:43+00:00"),
            rt_config(),
            200,
            BTreeMap::new(),
        )
        .unwrap();

        assert_eq!(
            extract.object_name().unwrap(),
            "vehicle_positions/dt=2022-08-17/hour=2022-08-17T14:00:00+00:00/\
             ts=2022-08-17T14:26:43+00:00/base64_url=aHR0cHM6Ly9yaWRlbXZnby5vcmcvZ3Rmcw==/feed"
        );
    }

    #[test]
    fn test_schedule_extract_path() {
        let extract = ScheduleFeedExtract::new(
            "gs://test-schedule".to_string(),
            "mygtfs.zip".to_string(),
            ts("2022-08-17T14:26:43+00:00"),
            schedule_config(),
            200,
            BTreeMap::new(),
        )
        .unwrap();

        assert_eq!(
            extract.object_name().unwrap(),
            "schedule/dt=2022-08-17/base64_url=aHR0cHM6Ly9yaWRlbXZnby5vcmcvZ3Rmcw==/\
             ts=2022-08-17T14:26:43+00:00/mygtfs.zip"
        );
    }

    #[test]
    fn test_feed_type_validation_is_enforced() {
        let err = ScheduleFeedExtract::new(
            "gs://b".to_string(),
            "f".to_string(),
            ts("2022-08-17T14:00:00+00:00"),
            rt_config(),
            200,
            BTreeMap::new(),
        );
        assert!(matches!(
            err,
            Err(GtfsError::MismatchedFeedType { expected: "schedule", .. })
        ));

        let err = RealtimeFeedExtract::new(
            "gs://b".to_string(),
            "f".to_string(),
            ts("2022-08-17T14:00:00+00:00"),
            schedule_config(),
            200,
            BTreeMap::new(),
        );
        assert!(matches!(
            err,
            Err(GtfsError::MismatchedFeedType { expected: "realtime", .. })
        ));
    }

    #[test]
    fn test_timestamped_filename_is_utc() {
        let extract = RealtimeFeedExtract::new(
            "gs://test-rt".to_string(),
            "feed".to_string(),
            ts("2022-08-17T06:26:43-08:00"),
            rt_config(),
            200,
            BTreeMap::new(),
        )
        .unwrap();
        assert_eq!(
            extract.timestamped_filename(),
            "feed__2022-08-17T14:26:43Z"
        );
    }

    #[test]
    fn test_metadata_json_omits_bucket_and_survives_round_trip() {
        let extract = RealtimeFeedExtract::new(
            "gs://test-rt".to_string(),
            "feed".to_string(),
            ts("2022-08-17T14:26:43+00:00"),
            rt_config(),
            200,
            BTreeMap::new(),
        )
        .unwrap();

        let json = serde_json::to_string(&extract).unwrap();
        assert!(!json.contains("test-rt"));

        let parsed: RealtimeFeedExtract = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.ts, extract.ts);
        assert_eq!(parsed.config, extract.config);
        assert_eq!(parsed.bucket, "");
    }

    #[tokio::test]
    async fn test_catalog_latest_loads_newest_snapshot() {
        let store = InMemory::new();

        for (when, names) in [
            ("2022-08-16T12:00:00+00:00", vec!["Old Transit"]),
            ("2022-08-17T12:00:00+00:00", vec!["Example RT", "Fresh Transit"]),
        ] {
            let records = names
                .into_iter()
                .map(|name| DownloadConfig {
                    name: name.to_string(),
                    ..rt_config()
                })
                .collect();
            let extract = CatalogExtract::new("memory://".to_string(), ts(when), records);
            let content = Bytes::from(extract.encode_records().unwrap());
            artifacts::save_artifact(&store, &extract, content)
                .await
                .unwrap();
        }

        let latest = CatalogExtract::latest(&store, "memory://").await.unwrap();
        assert_eq!(latest.ts, ts("2022-08-17T12:00:00+00:00"));
        assert_eq!(latest.records.len(), 2);
        assert_eq!(latest.records[1].name, "Fresh Transit");
        assert_eq!(latest.filename, CATALOG_FILENAME);
    }

    #[tokio::test]
    async fn test_catalog_latest_on_empty_store_is_structural_error() {
        let store = InMemory::new();
        match CatalogExtract::latest(&store, "memory://").await {
            Err(GtfsError::Artifact(artifacts::ArtifactError::NoChildren { prefix })) => {
                assert_eq!(prefix, CATALOG_TABLE);
            }
            other => panic!("expected no-children error, got {other:?}"),
        }
    }
}
