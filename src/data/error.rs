use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong between opening a catalog file and holding a
/// built [`Catalog`](super::model::Catalog).
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed XML at byte {position}: {message}")]
    Xml { position: u64, message: String },

    #[error("root element is not a VOTABLE in the VOTable namespace (found <{found}>)")]
    MissingNamespace { found: String },

    #[error("document contains no VOTable TABLE element")]
    NoTable,

    #[error("CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("unsupported file extension: {0}")]
    UnsupportedFormat(String),

    #[error("row {row} has {found} cells but the schema has {expected} columns")]
    SchemaMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("schema is missing required column '{0}'")]
    MissingColumn(&'static str),
}

impl CatalogError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CatalogError::Io {
            path: path.into(),
            source,
        }
    }
}
