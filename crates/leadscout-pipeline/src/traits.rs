//! Capability seams between the orchestrator and its network collaborators.

use async_trait::async_trait;
use leadscout_core::{AuditSignals, DeepAnalysis, RawLead};

/// Error returned by any capability. Only its message is kept.
pub type CapabilityError = Box<dyn std::error::Error + Send + Sync>;

#[async_trait]
pub trait BusinessDiscovery: Send + Sync {
    async fn search(
        &self,
        locality: &str,
        industry: &str,
        max_results: usize,
    ) -> Result<Vec<RawLead>, CapabilityError>;
}

#[async_trait]
pub trait SignalCollector: Send + Sync {
    async fn collect(&self, website: Option<&str>) -> Result<AuditSignals, CapabilityError>;
}

#[async_trait]
pub trait DeepAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        url: &str,
        name: &str,
        industry: &str,
    ) -> Result<DeepAnalysis, CapabilityError>;
}

#[async_trait]
pub trait IndustrySource: Send + Sync {
    async fn top_industries(&self, locality: &str, k: usize)
        -> Result<Vec<String>, CapabilityError>;
}
