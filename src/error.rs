use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the normalization pipeline.
///
/// Key violations and unmapped categorical codes are not errors: those rows
/// are dropped or relabelled and only show up in the load report.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A requested source column is absent (upstream schema drift)
    #[error("source column '{0}' not found")]
    MissingColumn(String),

    /// A date/time field could not be interpreted
    #[error("row {row}: cannot parse {field} from {value:?}")]
    Timestamp {
        row: usize,
        field: &'static str,
        value: String,
    },

    #[error("table '{0}' already exists")]
    TableExists(String),

    #[error("foreign key violation: {table} row {rowid} references a missing row in {parent}")]
    ForeignKeyViolation {
        table: String,
        rowid: i64,
        parent: String,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid load order: {0}")]
    LoadOrder(String),

    #[error("load cancelled before commit")]
    Cancelled,

    #[error("archive {0:?} does not contain a CSV file")]
    EmptyArchive(PathBuf),

    #[error("archive {path:?} contains more than one CSV file: {members:?}")]
    AmbiguousArchive { path: PathBuf, members: Vec<String> },

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
