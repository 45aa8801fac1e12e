//! Trait implementations for the concrete clients.

use async_trait::async_trait;
use leadscout_analysis::AnalysisClient;
use leadscout_audit::SiteAuditor;
use leadscout_core::{AuditSignals, DeepAnalysis, RawLead};
use leadscout_places::PlacesClient;

use crate::traits::{
    BusinessDiscovery, CapabilityError, DeepAnalyzer, IndustrySource, SignalCollector,
};

#[async_trait]
impl BusinessDiscovery for PlacesClient {
    async fn search(
        &self,
        locality: &str,
        industry: &str,
        max_results: usize,
    ) -> Result<Vec<RawLead>, CapabilityError> {
        Ok(PlacesClient::search(self, locality, industry, max_results).await?)
    }
}

#[async_trait]
impl SignalCollector for SiteAuditor {
    async fn collect(&self, website: Option<&str>) -> Result<AuditSignals, CapabilityError> {
        Ok(SiteAuditor::collect(self, website).await)
    }
}

#[async_trait]
impl DeepAnalyzer for AnalysisClient {
    async fn analyze(
        &self,
        url: &str,
        name: &str,
        industry: &str,
    ) -> Result<DeepAnalysis, CapabilityError> {
        Ok(AnalysisClient::analyze(self, url, name, industry).await?)
    }
}

/// Industry source backed by the static ranked catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogIndustries;

#[async_trait]
impl IndustrySource for CatalogIndustries {
    async fn top_industries(
        &self,
        locality: &str,
        k: usize,
    ) -> Result<Vec<String>, CapabilityError> {
        Ok(leadscout_places::top_industries(locality, k)?)
    }
}
