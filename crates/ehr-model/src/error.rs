use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

/// Error taxonomy shared by every pipeline stage.
///
/// All errors propagate synchronously to the immediate caller; the batch
/// entry point logs the full chain before exiting non-zero. There are no
/// retries and no partial resumption.
#[derive(Debug, Error)]
pub enum EhrError {
    /// A storage location handed to a constructor is missing or empty.
    #[error("storage location {} is unreadable or empty", location.display())]
    Configuration { location: PathBuf },

    /// A requested value falls outside its closed enumeration.
    #[error("invalid {argument} value {given:?}: expected one of {accepted}")]
    Validation {
        argument: &'static str,
        given: String,
        accepted: &'static str,
    },

    /// A raw extract is missing a column its descriptor declares.
    #[error("raw table {table:?} is missing required column {column:?}")]
    Schema {
        table: &'static str,
        column: String,
    },

    /// Storage became unreachable during a read or write.
    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

impl EhrError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, EhrError>;
