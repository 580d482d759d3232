use thiserror::Error;

/// Failures surfaced to API callers
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing or invalid session token")]
    InvalidSession,

    #[error("No dish image uploaded for this meal")]
    MissingImage,

    #[error("Unsupported image type '{0}', expected JPEG or PNG")]
    UnsupportedImage(String),

    #[error("The meal was replaced while its recommendation was being prepared")]
    DraftChanged,

    #[error("No logged meal at position {0}")]
    EntryNotFound(usize),

    #[error("{0}")]
    Invalid(String),

    #[error("Model request failed: {0}")]
    Model(#[source] anyhow::Error),
}
