//! The four kinds of GTFS feed the pipelines ingest.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GtfsError, Result};

/// Feed kind, also used verbatim as the storage table name for realtime
/// extracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedType {
    Schedule,
    ServiceAlerts,
    TripUpdates,
    VehiclePositions,
}

impl FeedType {
    pub const ALL: [FeedType; 4] = [
        FeedType::Schedule,
        FeedType::ServiceAlerts,
        FeedType::TripUpdates,
        FeedType::VehiclePositions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedType::Schedule => "schedule",
            FeedType::ServiceAlerts => "service_alerts",
            FeedType::TripUpdates => "trip_updates",
            FeedType::VehiclePositions => "vehicle_positions",
        }
    }

    /// Realtime feeds are everything except the static schedule.
    pub fn is_realtime(&self) -> bool {
        !matches!(self, FeedType::Schedule)
    }

    /// Best-effort match against free-form catalog text ("GTFS Alerts",
    /// "VehiclePositions", ...). Strict inputs should use [`FromStr`].
    pub fn classify(text: &str) -> Option<FeedType> {
        let lowered = text.to_lowercase();
        if lowered.contains("vehicle") {
            Some(FeedType::VehiclePositions)
        } else if lowered.contains("trip") {
            Some(FeedType::TripUpdates)
        } else if lowered.contains("alert") {
            Some(FeedType::ServiceAlerts)
        } else if lowered.contains("schedule") || lowered.contains("static") {
            Some(FeedType::Schedule)
        } else {
            None
        }
    }
}

impl fmt::Display for FeedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedType {
    type Err = GtfsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "schedule" => Ok(FeedType::Schedule),
            "service_alerts" => Ok(FeedType::ServiceAlerts),
            "trip_updates" => Ok(FeedType::TripUpdates),
            "vehicle_positions" => Ok(FeedType::VehiclePositions),
            other => Err(GtfsError::UnknownFeedType {
                value: other.to_string(),
            }),
        }
    }
}
