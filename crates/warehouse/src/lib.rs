//! calitp-warehouse: table registry and warehouse naming.
//!
//! The table inventory is declared statically in source; nothing here
//! connects to a warehouse. Set CALITP_LOG to control logging.

/// Error types for registry and naming
pub mod error;

/// Statically-declared table inventory
pub mod registry;

// Identifier and qualified-name formatting.
pub mod naming;

/// dbt and publish record kinds
pub mod artifact;

pub use artifact::{DbtArtifact, PublishArtifact};
pub use error::{Result, WarehouseError};
pub use naming::{NameOpts, qualified_name, safe_identifier};
pub use registry::{DEFAULT_TABLES, TableEntry, TableRegistry, default_registry};
