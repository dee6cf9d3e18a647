use std::collections::BTreeMap;

use artifacts::PartitionedArtifact;
use bytes::Bytes;
use chrono::DateTime;
use gtfs::{
    CatalogExtract, DownloadConfig, FeedType, RealtimeFeedExtract, SnapshotPick, fetch_snapshot,
};
use object_store::memory::InMemory;
use prost::Message;

fn config(name: &str, url: &str, feed_type: FeedType) -> DownloadConfig {
    DownloadConfig {
        name: name.to_string(),
        url: url.to_string(),
        feed_type,
        auth_query_params: BTreeMap::new(),
        auth_headers: BTreeMap::new(),
    }
}

/// Catalog snapshot to realtime extract: save two catalog snapshots, load
/// the newest, and use one of its configs to place a feed snapshot where
/// the rt tooling finds it.
#[tokio::test]
async fn test_catalog_drives_snapshot_layout() {
    let catalog_store = InMemory::new();

    for (when, url) in [
        ("2022-08-16T12:00:00+00:00", "https://old.example.com/vp"),
        ("2022-08-17T12:00:00+00:00", "https://ridemvgo.org/gtfs"),
    ] {
        let extract = CatalogExtract::new(
            "memory://".to_string(),
            DateTime::parse_from_rfc3339(when).unwrap(),
            vec![config("Example VP", url, FeedType::VehiclePositions)],
        );
        let content = Bytes::from(extract.encode_records().unwrap());
        artifacts::save_artifact(&catalog_store, &extract, content)
            .await
            .unwrap();
    }

    let catalog = CatalogExtract::latest(&catalog_store, "memory://")
        .await
        .unwrap();
    assert_eq!(catalog.records.len(), 1);
    assert_eq!(catalog.records[0].url, "https://ridemvgo.org/gtfs");

    // Store a decoded-able snapshot at the extract's declared path.
    let rt_store = InMemory::new();
    let extract = RealtimeFeedExtract::new(
        "memory://".to_string(),
        "feed".to_string(),
        DateTime::parse_from_rfc3339("2022-08-17T14:26:43+00:00").unwrap(),
        catalog.records[0].clone(),
        200,
        BTreeMap::new(),
    )
    .unwrap();

    let feed = gtfs::FeedMessage {
        header: Some(gtfs::realtime::FeedHeader {
            gtfs_realtime_version: "2.0".to_string(),
            timestamp: Some(1660746403),
        }),
        entity: vec![],
    };
    artifacts::save_artifact(&rt_store, &extract, Bytes::from(feed.encode_to_vec()))
        .await
        .unwrap();

    let (path, decoded) = fetch_snapshot(
        &rt_store,
        FeedType::VehiclePositions,
        None,
        SnapshotPick::Latest,
    )
    .await
    .unwrap();
    assert_eq!(path, extract.object_path().unwrap());
    assert_eq!(
        decoded.header.unwrap().gtfs_realtime_version,
        "2.0"
    );
}

/// The worked path example for realtime extracts: dt, hour, ts, then the
/// encoded URL, under the feed-type table.
#[test]
fn test_realtime_path_example() {
    let extract = RealtimeFeedExtract::new(
        "gs://gtfs-data".to_string(),
        "feed".to_string(),
        DateTime::parse_from_rfc3339("2022-08-17T14:00:00+00:00").unwrap(),
        config(
            "Example VP",
            "https://ridemvgo.org/gtfs",
            FeedType::VehiclePositions,
        ),
        200,
        BTreeMap::new(),
    )
    .unwrap();

    assert_eq!(
        extract.object_name().unwrap(),
        "vehicle_positions/dt=2022-08-17/hour=2022-08-17T14:00:00+00:00/\
         ts=2022-08-17T14:00:00+00:00/base64_url=aHR0cHM6Ly9yaWRlbXZnby5vcmcvZ3Rmcw==/feed"
    );
}
