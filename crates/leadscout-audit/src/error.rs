use leadscout_core::retry::{is_retriable_reqwest, is_retriable_status};
use leadscout_core::Retriable;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("PageSpeed API error: {0}")]
    PageSpeedApi(String),

    #[error("invalid website URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("traffic provider error: {0}")]
    Traffic(String),

    /// A failure observed by a concurrent caller of the same measurement.
    #[error("{0}")]
    Shared(String),
}

impl Retriable for AuditError {
    fn is_retriable(&self) -> bool {
        match self {
            AuditError::Http(e) => is_retriable_reqwest(e),
            AuditError::UnexpectedStatus { status, .. } => is_retriable_status(*status),
            AuditError::Deserialize { .. }
            | AuditError::PageSpeedApi(_)
            | AuditError::InvalidUrl { .. }
            | AuditError::Traffic(_)
            | AuditError::Shared(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_retriable() {
        let err = AuditError::UnexpectedStatus {
            status: 503,
            url: "https://example.com".to_string(),
        };
        assert!(err.is_retriable());
    }

    #[test]
    fn client_errors_are_not_retriable() {
        let err = AuditError::UnexpectedStatus {
            status: 404,
            url: "https://example.com".to_string(),
        };
        assert!(!err.is_retriable());
        assert!(!AuditError::PageSpeedApi("quota".to_string()).is_retriable());
    }
}
