use thiserror::Error;

/// Application-wide error types for mediaq.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request failed (fetching a directory listing or video page).
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Directory listing contained no recognizable media link.
    #[error("No media link found in listing at {0}")]
    NoMediaLink(String),

    /// Video page contained no recognizable publish date.
    #[error("No publish date found at {0}")]
    NoPublishDate(String),

    /// A date pattern matched but did not parse to a calendar date.
    #[error("Invalid publish date '{0}'")]
    InvalidDate(String),

    /// Spawning the external player or notifier process failed.
    #[error("Launch error: {0}")]
    LaunchError(String),
}

impl AppError {
    /// Returns true if this error came from the network side of a lookup,
    /// as opposed to the fetched content not matching any known pattern.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            AppError::HttpError(_) | AppError::NetworkError(_) | AppError::Timeout(_)
        )
    }
}
