//! Static table registry.
//!
//! Tables are declared in source rather than discovered by reflecting over
//! a live warehouse connection. A registry rejects duplicate
//! `dataset.table` pairs at construction and iterates in declaration
//! order.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use crate::error::{Result, WarehouseError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableEntry {
    pub dataset: &'static str,
    pub table: &'static str,
    pub description: &'static str,
}

impl TableEntry {
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.dataset, self.table)
    }
}

/// The known transit tables.
pub const DEFAULT_TABLES: &[TableEntry] = &[
    TableEntry {
        dataset: "california_transit",
        table: "gtfs_datasets",
        description: "Download-config catalog records for every tracked feed",
    },
    TableEntry {
        dataset: "california_transit",
        table: "organizations",
        description: "Transit organizations and their service relationships",
    },
    TableEntry {
        dataset: "mart_gtfs",
        table: "dim_schedule_feeds",
        description: "Versioned schedule feed downloads",
    },
    TableEntry {
        dataset: "mart_gtfs",
        table: "fct_scheduled_trips",
        description: "Scheduled trips by service date",
    },
    TableEntry {
        dataset: "mart_gtfs_rt",
        table: "fct_vehicle_positions_messages",
        description: "Decoded vehicle positions snapshots",
    },
    TableEntry {
        dataset: "mart_gtfs_rt",
        table: "fct_trip_updates_messages",
        description: "Decoded trip updates snapshots",
    },
];

#[derive(Debug, Clone)]
pub struct TableRegistry {
    entries: Vec<TableEntry>,
}

impl TableRegistry {
    /// Build a registry, rejecting duplicate `dataset.table` pairs.
    pub fn new(entries: &[TableEntry]) -> Result<TableRegistry> {
        let mut seen = BTreeSet::new();
        for entry in entries {
            if !seen.insert(entry.qualified()) {
                return Err(WarehouseError::DuplicateTable {
                    qualified: entry.qualified(),
                });
            }
        }
        diagnostics::log_debug!("Table registry built with {count} entries", count: entries.len());
        Ok(TableRegistry {
            entries: entries.to_vec(),
        })
    }

    pub fn get(&self, dataset: &str, table: &str) -> Result<&TableEntry> {
        self.entries
            .iter()
            .find(|entry| entry.dataset == dataset && entry.table == table)
            .ok_or_else(|| WarehouseError::UnknownTable {
                qualified: format!("{dataset}.{table}"),
            })
    }

    pub fn contains(&self, dataset: &str, table: &str) -> bool {
        self.get(dataset, table).is_ok()
    }

    /// Entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &TableEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn default_registry() -> &'static TableRegistry {
    static REGISTRY: LazyLock<TableRegistry> =
        LazyLock::new(|| TableRegistry::new(DEFAULT_TABLES).expect("default tables are unique"));
    &REGISTRY
}
