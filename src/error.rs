use std::path::PathBuf;

/// Errors that can abort a report run.
///
/// The report is consumed as a single document, so every variant is fatal:
/// there is no partial-report recovery and no chart is silently skipped.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("schema mismatch in {path}: expected {expected} columns, found {found}")]
    SchemaMismatch {
        path: PathBuf,
        expected: usize,
        found: usize,
    },

    #[error("missing column {index} ({name}) in {path}")]
    MissingColumn {
        path: PathBuf,
        index: usize,
        name: &'static str,
    },

    #[error("value {value:?} is not present in the {table} mapping")]
    UnmappedCategory { table: &'static str, value: String },

    #[error("empty aggregation: {context} has a zero denominator")]
    EmptyAggregation { context: String },

    #[error("failed to write {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to render chart {slug}: {message}")]
    Chart { slug: String, message: String },

    #[error("failed to build document: {0}")]
    Document(#[from] genpdf::error::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
