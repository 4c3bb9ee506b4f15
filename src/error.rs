use std::path::PathBuf;

use thiserror::Error;

/// Fatal problems reading a source spreadsheet. Bad cells are never errors;
/// they load as missing values.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to open workbook {path}: {message}")]
    Workbook { path: PathBuf, message: String },

    #[error("unsupported spreadsheet format: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("{path} has no header row")]
    EmptySheet { path: PathBuf },

    #[error("{path} is missing required column `{column}`")]
    MissingColumn { path: PathBuf, column: &'static str },
}
