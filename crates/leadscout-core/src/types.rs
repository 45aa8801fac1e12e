use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Label rendered for a site whose platform could not be fingerprinted.
pub const UNKNOWN_TECH_STACK: &str = "Unknown";

/// Sole issue recorded for a lead that has no usable website.
pub const NO_WEBSITE_ISSUE: &str = "no website";

/// A business as returned by the discovery collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLead {
    pub name: String,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub locality: String,
    /// Industry query the lead was discovered under.
    pub industry: String,
    /// Why the business's details could not be fetched. A lead carrying this
    /// has an unknown website, not a missing one. Taken into the audit issues
    /// when the lead is processed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details_error: Option<String>,
}

impl RawLead {
    /// Website with surrounding whitespace removed, or `None` when blank.
    #[must_use]
    pub fn website(&self) -> Option<&str> {
        self.website
            .as_deref()
            .map(str::trim)
            .filter(|w| !w.is_empty())
    }

    /// Blank website and phone values become `None`.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.website = non_blank(self.website);
        self.phone = non_blank(self.phone);
        self
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Results of inspecting a fetched homepage for markup signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MarkupChecks {
    pub has_structured_data: bool,
    pub has_faq_markup: bool,
    pub has_organization_markup: bool,
    pub meta_title_ok: bool,
    pub meta_description_ok: bool,
}

/// Independently measured signals for one website.
///
/// Every measurement is optional. `markup` is `None` when the homepage could
/// not be fetched, in which case the boolean accessors report `false`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AuditSignals {
    /// Largest Contentful Paint, in seconds.
    pub page_load_seconds: Option<f64>,
    /// Lighthouse performance score (0-100). Informational only.
    pub performance_score: Option<u8>,
    pub markup: Option<MarkupChecks>,
    /// Months since the last detectable content change.
    pub content_freshness_months: Option<u32>,
    /// Signed percent change in organic traffic over 90 days.
    pub traffic_trend_90d: Option<f64>,
    pub detected_tech_stack: Option<String>,
    /// Human-readable defects, in the order they were found.
    pub issues: Vec<String>,
    /// At least one measurement failed while collecting these signals.
    pub degraded: bool,
}

impl AuditSignals {
    /// Signals for a lead without a usable website.
    #[must_use]
    pub fn no_website() -> Self {
        Self {
            issues: vec![NO_WEBSITE_ISSUE.to_string()],
            ..Self::default()
        }
    }

    /// Signals for a lead whose audit could not run at all.
    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            issues: vec![reason.into()],
            degraded: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn has_structured_data(&self) -> bool {
        self.markup.is_some_and(|m| m.has_structured_data)
    }

    #[must_use]
    pub fn has_faq_markup(&self) -> bool {
        self.markup.is_some_and(|m| m.has_faq_markup)
    }

    #[must_use]
    pub fn has_organization_markup(&self) -> bool {
        self.markup.is_some_and(|m| m.has_organization_markup)
    }

    #[must_use]
    pub fn meta_title_ok(&self) -> bool {
        self.markup.is_some_and(|m| m.meta_title_ok)
    }

    #[must_use]
    pub fn meta_description_ok(&self) -> bool {
        self.markup.is_some_and(|m| m.meta_description_ok)
    }

    /// Detected platform, falling back to [`UNKNOWN_TECH_STACK`].
    #[must_use]
    pub fn tech_stack_label(&self) -> &str {
        self.detected_tech_stack
            .as_deref()
            .unwrap_or(UNKNOWN_TECH_STACK)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Hot,
    Warm,
    Cold,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Hot => write!(f, "hot"),
            Tier::Warm => write!(f, "warm"),
            Tier::Cold => write!(f, "cold"),
        }
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hot" => Ok(Tier::Hot),
            "warm" => Ok(Tier::Warm),
            "cold" => Ok(Tier::Cold),
            other => Err(format!("unknown tier '{other}'")),
        }
    }
}

/// A lead after scoring and classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredLead {
    pub lead: RawLead,
    pub audit: AuditSignals,
    pub score: u8,
    pub tier: Tier,
}

impl ScoredLead {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.lead.name
    }

    /// Returns the same lead with `issue` appended. Score and tier are kept.
    #[must_use]
    pub fn with_issue(mut self, issue: impl Into<String>) -> Self {
        self.audit.issues.push(issue.into());
        self
    }
}

/// Narrative enrichment produced by the language-model collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeepAnalysis {
    pub seo_score: Option<u8>,
    pub critical_issues: Vec<String>,
    pub revenue_impact: Option<String>,
    pub opportunities: Vec<String>,
    pub services_offered: Vec<String>,
    pub unique_selling_proposition: Option<String>,
    pub cta_quality: Option<String>,
    pub target_keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
    pub content_quality: Option<String>,
    pub quick_wins: Vec<String>,
    pub pitch_angle: Option<String>,
}

impl DeepAnalysis {
    /// Blank narrative fields become `None`.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.revenue_impact = non_blank(self.revenue_impact);
        self.unique_selling_proposition = non_blank(self.unique_selling_proposition);
        self.cta_quality = non_blank(self.cta_quality);
        self.content_quality = non_blank(self.content_quality);
        self.pitch_angle = non_blank(self.pitch_angle);
        self
    }
}

/// One output row: a scored lead, optionally carrying deep analysis.
#[derive(Debug, Clone, PartialEq)]
pub enum LeadRecord {
    Base(ScoredLead),
    WithDeepAnalysis {
        lead: ScoredLead,
        analysis: DeepAnalysis,
    },
}

impl LeadRecord {
    #[must_use]
    pub fn from_parts(lead: ScoredLead, analysis: Option<DeepAnalysis>) -> Self {
        match analysis {
            Some(analysis) => LeadRecord::WithDeepAnalysis { lead, analysis },
            None => LeadRecord::Base(lead),
        }
    }

    #[must_use]
    pub fn scored(&self) -> &ScoredLead {
        match self {
            LeadRecord::Base(lead) | LeadRecord::WithDeepAnalysis { lead, .. } => lead,
        }
    }

    #[must_use]
    pub fn deep_analysis(&self) -> Option<&DeepAnalysis> {
        match self {
            LeadRecord::Base(_) => None,
            LeadRecord::WithDeepAnalysis { analysis, .. } => Some(analysis),
        }
    }

    #[must_use]
    pub fn into_parts(self) -> (ScoredLead, Option<DeepAnalysis>) {
        match self {
            LeadRecord::Base(lead) => (lead, None),
            LeadRecord::WithDeepAnalysis { lead, analysis } => (lead, Some(analysis)),
        }
    }
}

/// How the industries for a run are chosen. Resolved once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndustryMode {
    /// Top industries discovered for each locality.
    Auto,
    /// Exactly the caller-supplied list.
    Manual(Vec<String>),
    /// Discovered industries plus the caller-supplied list.
    Hybrid(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead(website: Option<&str>) -> RawLead {
        RawLead {
            name: "Test Auto".to_string(),
            website: website.map(str::to_string),
            phone: None,
            locality: "Houston, TX".to_string(),
            industry: "auto dealers".to_string(),
            details_error: None,
        }
    }

    #[test]
    fn normalized_lead_drops_blank_contacts() {
        let raw = RawLead {
            phone: Some(String::new()),
            ..lead(Some("  "))
        };
        let tidy = raw.normalized();
        assert_eq!(tidy.website, None);
        assert_eq!(tidy.phone, None);

        let kept = RawLead {
            phone: Some("(512) 555-0100".to_string()),
            ..lead(Some("https://example.com"))
        }
        .normalized();
        assert_eq!(kept.website.as_deref(), Some("https://example.com"));
        assert_eq!(kept.phone.as_deref(), Some("(512) 555-0100"));
    }

    #[test]
    fn normalized_analysis_drops_blank_text() {
        let analysis = DeepAnalysis {
            revenue_impact: Some(String::new()),
            cta_quality: Some(" ".to_string()),
            pitch_angle: Some("Lead with page speed".to_string()),
            ..DeepAnalysis::default()
        }
        .normalized();
        assert_eq!(analysis.revenue_impact, None);
        assert_eq!(analysis.cta_quality, None);
        assert_eq!(analysis.pitch_angle.as_deref(), Some("Lead with page speed"));
    }

    #[test]
    fn blank_website_is_treated_as_missing() {
        assert_eq!(lead(Some("   ")).website(), None);
        assert_eq!(lead(None).website(), None);
        assert_eq!(
            lead(Some(" https://example.com ")).website(),
            Some("https://example.com")
        );
    }

    #[test]
    fn no_website_signals_carry_single_issue() {
        let audit = AuditSignals::no_website();
        assert_eq!(audit.issues, vec!["no website".to_string()]);
        assert!(audit.markup.is_none());
        assert!(audit.page_load_seconds.is_none());
        assert!(!audit.degraded);
    }

    #[test]
    fn markup_accessors_are_false_when_unmeasured() {
        let audit = AuditSignals::unavailable("site unreachable");
        assert!(!audit.has_structured_data());
        assert!(!audit.has_faq_markup());
        assert!(!audit.meta_title_ok());
        assert!(audit.degraded);
        assert_eq!(audit.tech_stack_label(), "Unknown");
    }

    #[test]
    fn tier_round_trips_through_display() {
        for tier in [Tier::Hot, Tier::Warm, Tier::Cold] {
            assert_eq!(tier.to_string().parse::<Tier>().unwrap(), tier);
        }
        assert!("lukewarm".parse::<Tier>().is_err());
    }

    #[test]
    fn with_issue_keeps_score_and_tier() {
        let scored = ScoredLead {
            lead: lead(Some("https://example.com")),
            audit: AuditSignals::default(),
            score: 72,
            tier: Tier::Hot,
        };
        let updated = scored.with_issue("deep analysis failed: timeout");
        assert_eq!(updated.score, 72);
        assert_eq!(updated.tier, Tier::Hot);
        assert_eq!(updated.audit.issues, vec!["deep analysis failed: timeout"]);
    }

    #[test]
    fn record_parts_preserve_variant() {
        let scored = ScoredLead {
            lead: lead(None),
            audit: AuditSignals::no_website(),
            score: 0,
            tier: Tier::Cold,
        };
        let base = LeadRecord::from_parts(scored.clone(), None);
        assert!(base.deep_analysis().is_none());

        let enriched = LeadRecord::from_parts(scored, Some(DeepAnalysis::default()));
        assert!(matches!(enriched, LeadRecord::WithDeepAnalysis { .. }));
        let (_, analysis) = enriched.into_parts();
        assert!(analysis.is_some());
    }

    #[test]
    fn deep_analysis_tolerates_missing_fields() {
        let analysis: DeepAnalysis =
            serde_json::from_str(r#"{"pitch_angle": "Your site is slow"}"#).unwrap();
        assert_eq!(analysis.pitch_angle.as_deref(), Some("Your site is slow"));
        assert!(analysis.critical_issues.is_empty());
    }
}
