use thiserror::Error;

pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Failures surfaced to the user as a single message. None are retried.
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Could not fetch the exams: {0}")]
    Fetch(String),

    #[error("Could not save the upload: {0}")]
    Insert(String),

    #[error("Could not store the file: {0}")]
    Storage(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),
}
