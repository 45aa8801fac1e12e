//! The enrichment run: discover, then collect, score, classify and
//! optionally analyse every lead with bounded concurrency.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use leadscout_core::{
    AppConfig, AuditSignals, IndustryMode, LeadRecord, RawLead, ScoredLead, ScoringConfig, Tier,
};
use leadscout_scoring::score_and_classify;

use crate::error::PipelineError;
use crate::industries::{resolve_pairs, SearchPair};
use crate::traits::{BusinessDiscovery, DeepAnalyzer, IndustrySource, SignalCollector};

/// Slack added on top of the slowest collector sub-request.
const COLLECT_TIMEOUT_SLACK: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub leads_per_industry: usize,
    pub max_industries: usize,
    pub max_concurrent_leads: usize,
    pub discovery_timeout: Duration,
    pub collect_timeout: Duration,
    pub analysis_timeout: Duration,
    pub scoring: ScoringConfig,
}

impl PipelineOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        let slowest = config.site_timeout_secs.max(config.pagespeed_timeout_secs);
        Self {
            leads_per_industry: config.leads_per_industry,
            max_industries: config.max_industries,
            max_concurrent_leads: config.max_concurrent_leads,
            discovery_timeout: Duration::from_secs(config.discovery_timeout_secs),
            collect_timeout: Duration::from_secs(slowest) + COLLECT_TIMEOUT_SLACK,
            analysis_timeout: Duration::from_secs(config.analysis_timeout_secs),
            scoring: ScoringConfig::default(),
        }
    }
}

/// Aggregate counts for one run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunSummary {
    pub localities: usize,
    pub industries: usize,
    pub leads_processed: usize,
    /// Leads with at least one failed measurement or a failed deep analysis.
    pub partial_failures: usize,
    pub hot: usize,
    pub warm: usize,
    pub cold: usize,
    pub average_score: f64,
    pub deep_analyses: usize,
    /// The run stopped early; only completed leads are included.
    pub cancelled: bool,
}

#[derive(Debug, Clone)]
pub struct BatchResult {
    pub records: Vec<LeadRecord>,
    pub summary: RunSummary,
}

struct LeadOutcome {
    record: LeadRecord,
    partial_failure: bool,
}

pub struct Pipeline {
    discovery: Arc<dyn BusinessDiscovery>,
    collector: Arc<dyn SignalCollector>,
    industries: Arc<dyn IndustrySource>,
    analyzer: Option<Arc<dyn DeepAnalyzer>>,
    options: PipelineOptions,
}

impl Pipeline {
    #[must_use]
    pub fn new(
        discovery: Arc<dyn BusinessDiscovery>,
        collector: Arc<dyn SignalCollector>,
        industries: Arc<dyn IndustrySource>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            discovery,
            collector,
            industries,
            analyzer: None,
            options,
        }
    }

    /// Enable deep analysis of Hot leads.
    #[must_use]
    pub fn with_analyzer(mut self, analyzer: Arc<dyn DeepAnalyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    /// Run over an explicit industry list.
    ///
    /// # Errors
    ///
    /// See [`Pipeline::run_until`].
    pub async fn run(
        &self,
        localities: &[String],
        industries: &[String],
    ) -> Result<BatchResult, PipelineError> {
        self.run_with_mode(localities, &IndustryMode::Manual(industries.to_vec()))
            .await
    }

    /// # Errors
    ///
    /// See [`Pipeline::run_until`].
    pub async fn run_with_mode(
        &self,
        localities: &[String],
        mode: &IndustryMode,
    ) -> Result<BatchResult, PipelineError> {
        self.run_until(localities, mode, std::future::pending::<()>())
            .await
    }

    /// Run until every lead is processed or `shutdown` resolves.
    ///
    /// On shutdown no further leads are started or awaited; the records
    /// already completed are returned and the summary is marked cancelled.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::InvalidLocality`] for a blank locality.
    /// - [`PipelineError::IndustryDiscovery`] / [`PipelineError::NoIndustries`]
    ///   if industries cannot be resolved.
    /// - [`PipelineError::Discovery`] if any business search fails or times
    ///   out. No leads are processed in that case.
    pub async fn run_until<S>(
        &self,
        localities: &[String],
        mode: &IndustryMode,
        shutdown: S,
    ) -> Result<BatchResult, PipelineError>
    where
        S: Future<Output = ()>,
    {
        let localities = validate_localities(localities)?;
        let pairs = resolve_pairs(
            mode,
            &localities,
            self.industries.as_ref(),
            self.options.max_industries,
        )
        .await?;
        let distinct_industries = pairs
            .iter()
            .map(|p| p.industry.to_lowercase())
            .collect::<HashSet<_>>()
            .len();

        tracing::info!(
            localities = localities.len(),
            pairs = pairs.len(),
            "starting discovery"
        );
        let leads = self.discover_all(&pairs).await?;
        tracing::info!(leads = leads.len(), "discovery complete, processing leads");

        let max_concurrent = self.options.max_concurrent_leads.max(1);
        let mut units = stream::iter(leads)
            .map(|lead| self.process_lead(lead))
            .buffer_unordered(max_concurrent);

        let mut outcomes = Vec::new();
        let mut cancelled = false;
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                biased;
                () = &mut shutdown => {
                    cancelled = true;
                    tracing::warn!(completed = outcomes.len(), "run cancelled");
                    break;
                }
                next = units.next() => match next {
                    Some(outcome) => outcomes.push(outcome),
                    None => break,
                },
            }
        }

        let summary = summarize(&outcomes, localities.len(), distinct_industries, cancelled);
        tracing::info!(
            leads_processed = summary.leads_processed,
            partial_failures = summary.partial_failures,
            hot = summary.hot,
            warm = summary.warm,
            cold = summary.cold,
            average_score = summary.average_score,
            deep_analyses = summary.deep_analyses,
            cancelled = summary.cancelled,
            "run complete"
        );

        Ok(BatchResult {
            records: outcomes.into_iter().map(|o| o.record).collect(),
            summary,
        })
    }

    async fn discover_all(&self, pairs: &[SearchPair]) -> Result<Vec<RawLead>, PipelineError> {
        let results: Vec<Result<Vec<RawLead>, PipelineError>> = stream::iter(pairs)
            .map(|pair| self.discover(pair))
            .buffered(self.options.max_concurrent_leads.max(1))
            .collect()
            .await;

        let mut leads = Vec::new();
        for result in results {
            leads.extend(result?);
        }
        Ok(leads)
    }

    async fn discover(&self, pair: &SearchPair) -> Result<Vec<RawLead>, PipelineError> {
        let search = self.discovery.search(
            &pair.locality,
            &pair.industry,
            self.options.leads_per_industry,
        );
        let reason = match tokio::time::timeout(self.options.discovery_timeout, search).await {
            Ok(Ok(mut leads)) => {
                leads.truncate(self.options.leads_per_industry);
                return Ok(leads.into_iter().map(RawLead::normalized).collect());
            }
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!(
                "timed out after {}s",
                self.options.discovery_timeout.as_secs()
            ),
        };
        Err(PipelineError::Discovery {
            locality: pair.locality.clone(),
            industry: pair.industry.clone(),
            reason,
        })
    }

    async fn process_lead(&self, mut lead: RawLead) -> LeadOutcome {
        let audit = match lead.details_error.take() {
            Some(reason) => {
                tracing::warn!(lead = %lead.name, error = %reason, "business details unavailable");
                AuditSignals::unavailable(format!("business details unavailable: {reason}"))
            }
            None => self.collect(&lead).await,
        };
        let mut partial_failure = audit.degraded;
        let scored = score_and_classify(lead, audit, &self.options.scoring);

        let target = scored.lead.website().map(str::to_string);
        let record = match (&self.analyzer, scored.tier, target) {
            (Some(analyzer), Tier::Hot, Some(url)) => {
                let analysis = tokio::time::timeout(
                    self.options.analysis_timeout,
                    analyzer.analyze(&url, &scored.lead.name, &scored.lead.industry),
                )
                .await;
                match analysis {
                    Ok(Ok(analysis)) => LeadRecord::WithDeepAnalysis {
                        lead: scored,
                        analysis: analysis.normalized(),
                    },
                    Ok(Err(e)) => {
                        partial_failure = true;
                        analysis_failed(scored, &e.to_string())
                    }
                    Err(_) => {
                        partial_failure = true;
                        let reason = format!(
                            "timed out after {}s",
                            self.options.analysis_timeout.as_secs()
                        );
                        analysis_failed(scored, &reason)
                    }
                }
            }
            _ => LeadRecord::Base(scored),
        };

        LeadOutcome {
            record,
            partial_failure,
        }
    }

    async fn collect(&self, lead: &RawLead) -> AuditSignals {
        let website = lead.website();
        if website.is_none() {
            return AuditSignals::no_website();
        }
        match tokio::time::timeout(self.options.collect_timeout, self.collector.collect(website))
            .await
        {
            Ok(Ok(signals)) => signals,
            Ok(Err(e)) => {
                tracing::warn!(lead = %lead.name, error = %e, "audit failed");
                AuditSignals::unavailable(format!("audit failed: {e}"))
            }
            Err(_) => {
                tracing::warn!(lead = %lead.name, "audit timed out");
                AuditSignals::unavailable(format!(
                    "audit failed: timed out after {}s",
                    self.options.collect_timeout.as_secs()
                ))
            }
        }
    }
}

fn analysis_failed(scored: ScoredLead, reason: &str) -> LeadRecord {
    tracing::warn!(lead = %scored.lead.name, error = %reason, "deep analysis failed");
    LeadRecord::Base(scored.with_issue(format!("deep analysis failed: {reason}")))
}

fn validate_localities(localities: &[String]) -> Result<Vec<String>, PipelineError> {
    if localities.is_empty() {
        return Err(PipelineError::InvalidLocality(String::new()));
    }
    localities
        .iter()
        .map(|l| {
            let trimmed = l.trim();
            if trimmed.is_empty() {
                Err(PipelineError::InvalidLocality(l.clone()))
            } else {
                Ok(trimmed.to_string())
            }
        })
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn summarize(
    outcomes: &[LeadOutcome],
    localities: usize,
    industries: usize,
    cancelled: bool,
) -> RunSummary {
    let mut summary = RunSummary {
        localities,
        industries,
        leads_processed: outcomes.len(),
        cancelled,
        ..RunSummary::default()
    };
    let mut total: u64 = 0;
    for outcome in outcomes {
        let scored = outcome.record.scored();
        total += u64::from(scored.score);
        match scored.tier {
            Tier::Hot => summary.hot += 1,
            Tier::Warm => summary.warm += 1,
            Tier::Cold => summary.cold += 1,
        }
        if outcome.partial_failure {
            summary.partial_failures += 1;
        }
        if outcome.record.deep_analysis().is_some() {
            summary.deep_analyses += 1;
        }
    }
    if !outcomes.is_empty() {
        summary.average_score = total as f64 / outcomes.len() as f64;
    }
    summary
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
