// crates/geopop-core/src/error.rs
use thiserror::Error;

/// Errors surfaced by `geopop-core`.
///
/// Only configuration problems and dataset I/O are errors. A raw value that
/// resolves to nothing is not: it becomes a row of missing values so batch
/// lookups never abort on a single bad identifier.
#[derive(Debug, Error)]
pub enum GeopopError {
    /// Unrecognized level, population limits literal, labels count,
    /// data year or column pattern.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An explicit `return_cols` entry names a column that does not exist.
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    /// A dataset file could not be found.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Bincode(#[from] bincode::Error),
}

pub type Result<T> = std::result::Result<T, GeopopError>;

impl GeopopError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        GeopopError::InvalidArgument(msg.into())
    }
}
