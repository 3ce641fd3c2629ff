use thiserror::Error;

/// Fatal errors raised before any upload starts.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("CSV file not found: {path}")]
    CsvNotFound { path: String },

    #[error("could not open CSV file {path}: {source}")]
    CsvIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not read CSV file {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("CSV file is empty or has no header row: {path}")]
    EmptyCsv { path: String },
}
