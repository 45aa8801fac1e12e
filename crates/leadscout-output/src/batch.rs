//! CSV persistence of a batch of lead records.
//!
//! One row per lead. List-valued columns (`Issues` and the `LLM_*` lists)
//! hold JSON arrays so values containing commas survive a round trip.
//! A batch file is written once and never overwritten.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use leadscout_core::{AuditSignals, DeepAnalysis, LeadRecord, MarkupChecks, RawLead, ScoredLead, Tier};
use leadscout_scoring::report_order;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::artifact::{create_unique, latest_artifact};
use crate::error::OutputError;

const BATCH_PREFIX: &str = "leads";
const BATCH_EXT: &str = "csv";

#[derive(Debug, Serialize, Deserialize)]
struct LeadRow {
    #[serde(rename = "RunId")]
    run_id: Uuid,
    #[serde(rename = "RunDate")]
    run_date: NaiveDate,
    #[serde(rename = "Geo")]
    geo: String,
    #[serde(rename = "Industry")]
    industry: String,
    #[serde(rename = "BusinessName")]
    business_name: String,
    #[serde(rename = "Website")]
    website: Option<String>,
    #[serde(rename = "Phone")]
    phone: Option<String>,
    #[serde(rename = "TechStack")]
    tech_stack: Option<String>,
    #[serde(rename = "CoreWebVitals_LCP")]
    lcp_seconds: Option<f64>,
    #[serde(rename = "PerformanceScore")]
    performance_score: Option<u8>,
    #[serde(rename = "HasSchema")]
    has_schema: Option<bool>,
    #[serde(rename = "HasFAQ")]
    has_faq: Option<bool>,
    #[serde(rename = "HasOrg")]
    has_org: Option<bool>,
    #[serde(rename = "MetaTitleOK")]
    meta_title_ok: Option<bool>,
    #[serde(rename = "MetaDescOK")]
    meta_desc_ok: Option<bool>,
    #[serde(rename = "ContentFreshMonths")]
    content_fresh_months: Option<u32>,
    #[serde(rename = "TrafficTrend_90d")]
    traffic_trend_90d: Option<f64>,
    #[serde(rename = "Issues")]
    issues: String,
    #[serde(rename = "Degraded")]
    degraded: bool,
    #[serde(rename = "Score")]
    score: u8,
    #[serde(rename = "Tier")]
    tier: Tier,
    #[serde(rename = "DeepAnalysis")]
    has_deep_analysis: bool,
    #[serde(rename = "LLM_SEOScore")]
    llm_seo_score: Option<u8>,
    #[serde(rename = "LLM_CriticalIssues")]
    llm_critical_issues: String,
    #[serde(rename = "LLM_RevenueImpact")]
    llm_revenue_impact: Option<String>,
    #[serde(rename = "LLM_Opportunities")]
    llm_opportunities: String,
    #[serde(rename = "LLM_ServicesOffered")]
    llm_services_offered: String,
    #[serde(rename = "LLM_USP")]
    llm_usp: Option<String>,
    #[serde(rename = "LLM_CTAQuality")]
    llm_cta_quality: Option<String>,
    #[serde(rename = "LLM_TargetKeywords")]
    llm_target_keywords: String,
    #[serde(rename = "LLM_MissingKeywords")]
    llm_missing_keywords: String,
    #[serde(rename = "LLM_ContentQuality")]
    llm_content_quality: Option<String>,
    #[serde(rename = "LLM_QuickWins")]
    llm_quick_wins: String,
    #[serde(rename = "LLM_PitchAngle")]
    llm_pitch_angle: Option<String>,
}

fn encode_list(column: &str, items: &[String]) -> Result<String, OutputError> {
    if items.is_empty() {
        return Ok(String::new());
    }
    serde_json::to_string(items).map_err(|e| OutputError::InvalidColumn {
        column: column.to_string(),
        reason: e.to_string(),
    })
}

fn decode_list(column: &str, raw: &str) -> Result<Vec<String>, OutputError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(raw).map_err(|e| OutputError::InvalidColumn {
        column: column.to_string(),
        reason: e.to_string(),
    })
}

impl LeadRow {
    fn from_record(record: &LeadRecord, run_id: Uuid, run_date: NaiveDate) -> Result<Self, OutputError> {
        let scored = record.scored();
        let audit = &scored.audit;
        let markup = audit.markup;
        let analysis = record.deep_analysis();
        let empty = DeepAnalysis::default();
        let llm = analysis.unwrap_or(&empty);

        Ok(Self {
            run_id,
            run_date,
            geo: scored.lead.locality.clone(),
            industry: scored.lead.industry.clone(),
            business_name: scored.lead.name.clone(),
            website: scored.lead.website.clone(),
            phone: scored.lead.phone.clone(),
            tech_stack: audit.detected_tech_stack.clone(),
            lcp_seconds: audit.page_load_seconds,
            performance_score: audit.performance_score,
            has_schema: markup.map(|m| m.has_structured_data),
            has_faq: markup.map(|m| m.has_faq_markup),
            has_org: markup.map(|m| m.has_organization_markup),
            meta_title_ok: markup.map(|m| m.meta_title_ok),
            meta_desc_ok: markup.map(|m| m.meta_description_ok),
            content_fresh_months: audit.content_freshness_months,
            traffic_trend_90d: audit.traffic_trend_90d,
            issues: encode_list("Issues", &audit.issues)?,
            degraded: audit.degraded,
            score: scored.score,
            tier: scored.tier,
            has_deep_analysis: analysis.is_some(),
            llm_seo_score: llm.seo_score,
            llm_critical_issues: encode_list("LLM_CriticalIssues", &llm.critical_issues)?,
            llm_revenue_impact: llm.revenue_impact.clone(),
            llm_opportunities: encode_list("LLM_Opportunities", &llm.opportunities)?,
            llm_services_offered: encode_list("LLM_ServicesOffered", &llm.services_offered)?,
            llm_usp: llm.unique_selling_proposition.clone(),
            llm_cta_quality: llm.cta_quality.clone(),
            llm_target_keywords: encode_list("LLM_TargetKeywords", &llm.target_keywords)?,
            llm_missing_keywords: encode_list("LLM_MissingKeywords", &llm.missing_keywords)?,
            llm_content_quality: llm.content_quality.clone(),
            llm_quick_wins: encode_list("LLM_QuickWins", &llm.quick_wins)?,
            llm_pitch_angle: llm.pitch_angle.clone(),
        })
    }

    fn into_record(self) -> Result<LeadRecord, OutputError> {
        let markup = self.has_schema.map(|has_structured_data| MarkupChecks {
            has_structured_data,
            has_faq_markup: self.has_faq.unwrap_or(false),
            has_organization_markup: self.has_org.unwrap_or(false),
            meta_title_ok: self.meta_title_ok.unwrap_or(false),
            meta_description_ok: self.meta_desc_ok.unwrap_or(false),
        });

        let scored = ScoredLead {
            lead: RawLead {
                name: self.business_name,
                website: self.website,
                phone: self.phone,
                locality: self.geo,
                industry: self.industry,
                details_error: None,
            },
            audit: AuditSignals {
                traffic_trend_90d: self.traffic_trend_90d,
                page_load_seconds: self.lcp_seconds,
                performance_score: self.performance_score,
                markup,
                content_freshness_months: self.content_fresh_months,
                detected_tech_stack: self.tech_stack,
                issues: decode_list("Issues", &self.issues)?,
                degraded: self.degraded,
            },
            score: self.score,
            tier: self.tier,
        };

        let analysis = if self.has_deep_analysis {
            Some(DeepAnalysis {
                seo_score: self.llm_seo_score,
                critical_issues: decode_list("LLM_CriticalIssues", &self.llm_critical_issues)?,
                revenue_impact: self.llm_revenue_impact,
                opportunities: decode_list("LLM_Opportunities", &self.llm_opportunities)?,
                services_offered: decode_list("LLM_ServicesOffered", &self.llm_services_offered)?,
                unique_selling_proposition: self.llm_usp,
                cta_quality: self.llm_cta_quality,
                target_keywords: decode_list("LLM_TargetKeywords", &self.llm_target_keywords)?,
                missing_keywords: decode_list("LLM_MissingKeywords", &self.llm_missing_keywords)?,
                content_quality: self.llm_content_quality,
                quick_wins: decode_list("LLM_QuickWins", &self.llm_quick_wins)?,
                pitch_angle: self.llm_pitch_angle,
            })
        } else {
            None
        };

        Ok(LeadRecord::from_parts(scored, analysis))
    }
}

/// Writes batches into one output directory.
#[derive(Debug, Clone)]
pub struct BatchSink {
    dir: PathBuf,
}

impl BatchSink {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `records` as `leads_<YYYYMMDD_HHMMSS>.csv`, rows in report
    /// order. Returns the path written.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError`] if the file cannot be created or written.
    pub fn write(
        &self,
        records: &[LeadRecord],
        run_id: Uuid,
        started_at: DateTime<Utc>,
    ) -> Result<PathBuf, OutputError> {
        let (path, file) = create_unique(&self.dir, BATCH_PREFIX, started_at, BATCH_EXT)?;

        let mut ordered: Vec<&LeadRecord> = records.iter().collect();
        ordered.sort_by(|a, b| report_order(a.scored(), b.scored()));

        let run_date = started_at.date_naive();
        let mut writer = csv::Writer::from_writer(file);
        for record in ordered {
            writer.serialize(LeadRow::from_record(record, run_id, run_date)?)?;
        }
        writer.flush().map_err(|e| OutputError::io(&path, e))?;

        tracing::info!(path = %path.display(), rows = records.len(), "batch written");
        Ok(path)
    }
}

/// Read a batch file back into records.
///
/// # Errors
///
/// Returns [`OutputError`] if the file cannot be read or a row is malformed.
pub fn read_batch(path: &Path) -> Result<Vec<LeadRecord>, OutputError> {
    let mut reader = csv::Reader::from_path(path)?;
    reader
        .deserialize::<LeadRow>()
        .map(|row| row?.into_record())
        .collect()
}

/// Newest `leads_*.csv` in `dir`, if any.
///
/// # Errors
///
/// Returns [`OutputError::Io`] if `dir` cannot be listed.
pub fn latest_batch(dir: &Path) -> Result<Option<PathBuf>, OutputError> {
    latest_artifact(dir, BATCH_PREFIX, BATCH_EXT)
}

/// Tier counts and score average for a stored or fresh batch.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchStats {
    pub total: usize,
    pub hot: usize,
    pub warm: usize,
    pub cold: usize,
    pub average_score: f64,
    pub deep_analyses: usize,
    pub without_website: usize,
}

impl BatchStats {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_records(records: &[LeadRecord]) -> Self {
        let mut stats = Self {
            total: records.len(),
            ..Self::default()
        };
        let mut total_score: u64 = 0;
        for record in records {
            let scored = record.scored();
            total_score += u64::from(scored.score);
            match scored.tier {
                Tier::Hot => stats.hot += 1,
                Tier::Warm => stats.warm += 1,
                Tier::Cold => stats.cold += 1,
            }
            if record.deep_analysis().is_some() {
                stats.deep_analyses += 1;
            }
            if scored.lead.website().is_none() {
                stats.without_website += 1;
            }
        }
        if !records.is_empty() {
            stats.average_score = total_score as f64 / records.len() as f64;
        }
        stats
    }
}

#[cfg(test)]
#[path = "batch_test.rs"]
mod tests;
