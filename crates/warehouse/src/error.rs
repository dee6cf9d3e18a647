use thiserror::Error;

/// Error type for warehouse naming and registry operations.
#[derive(Debug, Error)]
pub enum WarehouseError {
    #[error("duplicate table entry '{qualified}' in registry")]
    DuplicateTable { qualified: String },

    #[error("unknown table '{qualified}'")]
    UnknownTable { qualified: String },
}

pub type Result<T> = std::result::Result<T, WarehouseError>;
