//! Errors raised while loading, validating or writing a BOM table.

use std::path::PathBuf;

/// Fatal errors. Row-level parse failures never end up here; they fall back
/// to documented defaults instead.
#[derive(Debug, thiserror::Error)]
pub enum BomError {
    #[error("Missing column '{0}' in input table")]
    MissingColumn(String),

    #[error("Input table has no header row")]
    EmptyTable,

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
}

impl BomError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BomError::Io {
            path: path.into(),
            source,
        }
    }
}
