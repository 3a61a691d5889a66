use thiserror::Error;

/// Application-wide error types for argus.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request failed (non-2xx status or protocol error).
    #[error("HTTP error: {0}")]
    Http(String),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Network/connection error.
    #[error("Network error: {0}")]
    Network(String),

    /// A fetched document could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Outbound notification failed.
    #[error("Notification error: {0}")]
    Notification(String),

    /// Writing to the result sink failed. Fatal to the run.
    #[error("Sink error: {0}")]
    Sink(String),

    /// Caller-supplied input was unusable (empty list, unreadable file).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    /// Returns true if this error is transient and worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            AppError::Network(_) | AppError::Timeout(_) => true,
            AppError::Http(msg) => {
                msg.contains("timeout") || msg.contains("connect") || msg.contains("reset")
            }
            _ => false,
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_errors() {
        assert!(AppError::Network("reset".into()).is_transient());
        assert!(AppError::Timeout(10).is_transient());
        assert!(AppError::Http("connect refused".into()).is_transient());
        assert!(!AppError::Http("HTTP 404 for https://a.test".into()).is_transient());
        assert!(!AppError::Sink("disk full".into()).is_transient());
        assert!(!AppError::Notification("telegram 502".into()).is_transient());
    }
}
