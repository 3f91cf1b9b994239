use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not read workbook: {0}")]
    Workbook(String),

    #[error("Unknown sheet: {name} (available: {available})")]
    UnknownSheet { name: String, available: String },

    #[error("Column '{column}' is not numeric (numeric columns: {numeric})")]
    NotNumeric { column: String, numeric: String },

    #[error("Invalid rate '{0}': expected CODE=VALUE, e.g. EUR=0.92")]
    InvalidRate(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Context(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
