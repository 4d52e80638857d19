use thiserror::Error;

/// Conditions that abort a job before or while records are processed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobError {
    #[error("ZIP code is a required field: no zip column in header {0:?}")]
    MissingZipColumn(Vec<String>),

    #[error("Invalid central zip code: {0:?}")]
    InvalidCentralZip(String),

    #[error("Invalid configuration: {field} minimum {min} exceeds maximum {max}")]
    InvalidRange {
        field: &'static str,
        min: u32,
        max: u32,
    },

    #[error("Input has no header row")]
    EmptyInput,
}
