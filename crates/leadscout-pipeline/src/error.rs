use thiserror::Error;

/// Run-level failures. Per-lead problems never surface here; they are
/// recorded on the affected lead instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid locality: {0:?}")]
    InvalidLocality(String),

    #[error("discovery failed for {industry} in {locality}: {reason}")]
    Discovery {
        locality: String,
        industry: String,
        reason: String,
    },

    #[error("industry discovery failed for {locality}: {reason}")]
    IndustryDiscovery { locality: String, reason: String },

    #[error("no industries to search")]
    NoIndustries,
}
