use leadscout_core::retry::{is_retriable_reqwest, is_retriable_status};
use leadscout_core::Retriable;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Claude API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("model returned no text content")]
    EmptyResponse,

    #[error("could not fetch page for analysis: {0}")]
    PageFetch(String),

    #[error("invalid API key header value")]
    InvalidApiKey,

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl Retriable for AnalysisError {
    fn is_retriable(&self) -> bool {
        match self {
            AnalysisError::Http(e) => is_retriable_reqwest(e),
            // 529 is Anthropic's "overloaded" status.
            AnalysisError::Api { status, .. } => is_retriable_status(*status) || *status == 529,
            AnalysisError::Deserialize { .. }
            | AnalysisError::EmptyResponse
            | AnalysisError::PageFetch(_)
            | AnalysisError::InvalidApiKey
            | AnalysisError::InvalidBaseUrl { .. } => false,
        }
    }
}
