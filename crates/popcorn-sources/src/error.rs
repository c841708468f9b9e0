use thiserror::Error;

/// Failure of a single request against a movie source.
///
/// `Display` is the message shown to the user; the underlying cause stays
/// reachable through `source()` for logging.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Something went wrong")]
    Transport(#[from] reqwest::Error),

    #[error("Something went wrong")]
    Status(reqwest::StatusCode),

    /// Successful response whose body is not the expected JSON
    #[error("Something went wrong")]
    Decode(#[source] serde_json::Error),

    /// Well-formed response reporting no match
    #[error("Movie not found")]
    NotFound { reason: Option<String> },

    /// The request was superseded and aborted; never shown to the user
    #[error("Request cancelled")]
    Cancelled,
}

impl SourceError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SourceError::Cancelled)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SourceError::NotFound { .. })
    }

    /// Human-readable detail for logs (status code, upstream reason, transport cause)
    pub fn detail(&self) -> String {
        match self {
            SourceError::Transport(e) => e.to_string(),
            SourceError::Status(status) => format!("HTTP {}", status),
            SourceError::Decode(e) => format!("undecodable response: {}", e),
            SourceError::NotFound { reason } => reason.clone().unwrap_or_else(|| "no reason given".to_string()),
            SourceError::Cancelled => "cancelled".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_facing_messages() {
        assert_eq!(SourceError::Status(reqwest::StatusCode::BAD_GATEWAY).to_string(), "Something went wrong");
        assert_eq!(SourceError::NotFound { reason: None }.to_string(), "Movie not found");
        assert!(SourceError::Cancelled.is_cancelled());
        assert!(SourceError::NotFound { reason: Some("Too many results.".into()) }.is_not_found());
    }

    #[test]
    fn test_decode_failure_is_not_reported_as_status() {
        let err = SourceError::Decode(serde_json::from_str::<u32>("<html>").unwrap_err());
        assert_eq!(err.to_string(), "Something went wrong");
        assert!(err.detail().starts_with("undecodable response"));
        assert!(!err.detail().contains("HTTP"));
    }

    #[test]
    fn test_detail_carries_status() {
        let err = SourceError::Status(reqwest::StatusCode::UNAUTHORIZED);
        assert!(err.detail().contains("401"));
    }
}
