use leadscout_core::retry::{is_retriable_reqwest, is_retriable_status};
use leadscout_core::Retriable;
use thiserror::Error;

/// Errors returned by the Places client and the industry catalog.
#[derive(Debug, Error)]
pub enum PlacesError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The API answered with a non-OK `status` field.
    #[error("Places API error {status}: {message}")]
    Api { status: String, message: String },

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl Retriable for PlacesError {
    fn is_retriable(&self) -> bool {
        match self {
            PlacesError::Http(e) => is_retriable_reqwest(e),
            PlacesError::UnexpectedStatus { status, .. } => is_retriable_status(*status),
            PlacesError::Api { status, .. } => {
                status == "OVER_QUERY_LIMIT" || status == "UNKNOWN_ERROR"
            }
            PlacesError::Deserialize { .. }
            | PlacesError::InvalidQuery(_)
            | PlacesError::InvalidBaseUrl { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: &str) -> PlacesError {
        PlacesError::Api {
            status: status.to_string(),
            message: String::new(),
        }
    }

    #[test]
    fn quota_and_unknown_errors_are_retriable() {
        assert!(api("OVER_QUERY_LIMIT").is_retriable());
        assert!(api("UNKNOWN_ERROR").is_retriable());
    }

    #[test]
    fn denied_requests_are_not_retriable() {
        assert!(!api("REQUEST_DENIED").is_retriable());
        assert!(!api("INVALID_REQUEST").is_retriable());
        assert!(!PlacesError::InvalidQuery("blank".to_string()).is_retriable());
    }
}
