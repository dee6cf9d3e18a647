use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use cmd::commands;

#[derive(Parser)]
#[command(author, version, about = "Cal-ITP transit data utilities", long_about = None)]
#[command(name = "calitp")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the newest leaf under a partitioned table
    Latest {
        /// Bucket URL or bare bucket name
        #[arg(long)]
        bucket: String,
        /// Table (top path component) to resolve under
        #[arg(long)]
        table: String,
        /// Ordered partition declarations, e.g. dt:date hour:timestamp
        #[arg(long = "partition", required = true)]
        partitions: Vec<String>,
    },
    /// List one level of a bucket prefix
    Ls {
        /// Bucket URL or bare bucket name
        #[arg(long)]
        bucket: String,
        /// Prefix to list under; defaults to the bucket root
        prefix: Option<String>,
    },
    /// Fetch and summarize a stored realtime snapshot
    Rt {
        /// Bucket URL or bare bucket name
        #[arg(long)]
        bucket: String,
        /// service_alerts, trip_updates, or vehicle_positions
        #[arg(long = "feed-type")]
        feed_type: String,
        /// Narrow to one date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
        /// Pick a random snapshot instead of the newest
        #[arg(long)]
        random: bool,
        /// Dump the raw protobuf bytes to stdout
        #[arg(long)]
        raw: bool,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the table inventory with environment-qualified names
    Tables {
        /// Leading project component
        #[arg(long)]
        project: Option<String>,
        /// Append the __staging suffix
        #[arg(long)]
        staging: bool,
    },
    /// Publish a JSONL file as one object per partition
    Publish {
        /// Bucket URL or bare bucket name
        #[arg(long)]
        bucket: String,
        /// Destination table under the bucket
        #[arg(long)]
        table: String,
        /// Partition columns, in order
        #[arg(long = "by", required = true)]
        by: Vec<String>,
        /// Write zstd-compressed objects
        #[arg(long)]
        compress: bool,
        /// JSON-lines input file
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    diagnostics::init_diagnostics();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Latest {
            bucket,
            table,
            partitions,
        } => commands::latest_command(bucket, table, partitions).await,
        Commands::Ls { bucket, prefix } => commands::ls_command(bucket, prefix.as_deref()).await,
        Commands::Rt {
            bucket,
            feed_type,
            date,
            random,
            raw,
            json,
        } => commands::rt_command(bucket, feed_type, date.as_deref(), *random, *raw, *json).await,
        Commands::Tables { project, staging } => {
            commands::tables_command(project.as_deref(), *staging)
        }
        Commands::Publish {
            bucket,
            table,
            by,
            compress,
            file,
        } => commands::publish_command(bucket, table, by, *compress, file).await,
    }
}
