use thiserror::Error;

#[derive(Error, Debug)]
pub enum IrriOpsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dataset is missing column '{column}' required by {treatment}")]
    MissingColumn {
        column: &'static str,
        treatment: &'static str,
    },

    #[error("Reading at {timestamp}: no value for '{column}' required by {treatment}")]
    MissingValue {
        timestamp: chrono::NaiveDateTime,
        column: &'static str,
        treatment: &'static str,
    },

    #[error("Row {row}: column '{column}' has non-numeric value '{value}'")]
    InvalidValue {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Row {row}: cannot parse timestamp '{value}'")]
    InvalidTimestamp { row: usize, value: String },

    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),

    #[error("Unknown treatment '{0}' (expected t1-t4 or a treatment label)")]
    UnknownTreatment(String),
}

pub type Result<T> = std::result::Result<T, IrriOpsError>;
