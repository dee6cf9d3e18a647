use anyhow::{Context, Result};
use object_store::path::Path;

use crate::common::open_bucket;

/// Delimiter-list one level of a bucket prefix.
#[allow(clippy::print_stdout)]
pub async fn ls_command(bucket: &str, prefix: Option<&str>) -> Result<()> {
    let store = open_bucket(bucket)?;
    let prefix = prefix.map(Path::from);

    let listing = store
        .list_with_delimiter(prefix.as_ref())
        .await
        .context("listing prefix")?;

    for dir in &listing.common_prefixes {
        println!("{dir}/");
    }
    for object in &listing.objects {
        println!("{} {}", object.location, object.size);
    }
    Ok(())
}
