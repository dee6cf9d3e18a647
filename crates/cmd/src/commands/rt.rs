use std::io::Write;

use anyhow::{Context, Result};
use gtfs::{FeedType, SnapshotPick};

use crate::common::{open_bucket, parse_date};

/// Fetch one realtime snapshot and summarize it (or dump the raw bytes).
#[allow(clippy::print_stdout)]
pub async fn rt_command(
    bucket: &str,
    feed_type: &str,
    date: Option<&str>,
    random: bool,
    raw: bool,
    json: bool,
) -> Result<()> {
    let store = open_bucket(bucket)?;
    let feed_type: FeedType = feed_type.parse()?;
    let date = date.map(parse_date).transpose()?;
    let pick = if random {
        SnapshotPick::Random
    } else {
        SnapshotPick::Latest
    };

    if raw {
        let (path, bytes) = gtfs::fetch_snapshot_bytes(store.as_ref(), feed_type, date, pick)
            .await
            .context("fetching snapshot")?;
        diagnostics::log_info!("Dumping raw snapshot {path}", path: path.to_string());
        std::io::stdout().write_all(&bytes)?;
        return Ok(());
    }

    let (path, feed) = gtfs::fetch_snapshot(store.as_ref(), feed_type, date, pick)
        .await
        .context("fetching snapshot")?;
    let summary = gtfs::summarize(&path, &feed);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{}", summary.path);
    println!("  version:        {}", summary.gtfs_realtime_version);
    match summary.feed_timestamp {
        Some(ts) => println!("  feed timestamp: {ts}"),
        None => println!("  feed timestamp: (absent)"),
    }
    println!(
        "  entities:       {} ({} vehicle positions, {} trip updates, {} alerts)",
        summary.entities, summary.vehicle_positions, summary.trip_updates, summary.alerts
    );
    if !summary.sample_entity_ids.is_empty() {
        println!("  sample ids:     {}", summary.sample_entity_ids.join(", "));
    }
    Ok(())
}
