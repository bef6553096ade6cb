// Error handling for the trajectory core

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DashError>;

#[derive(Error, Debug)]
pub enum DashError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Malformed row {row}: {reason}")]
    MalformedRow { row: usize, reason: String },

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(f64),

    #[error("Malformed selection: {0}")]
    MalformedSelection(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Instance {0} carries more than one interpretation")]
    InconsistentInterpretation(String),

    #[error("Decompression failed: {0}")]
    DecompressionFailed(String),
}

impl DashError {
    /// True for errors caused by what the caller asked for rather than by the data.
    pub fn is_rejected_selection(&self) -> bool {
        matches!(
            self,
            DashError::MalformedSelection(_) | DashError::InvalidDate(_)
        )
    }
}
