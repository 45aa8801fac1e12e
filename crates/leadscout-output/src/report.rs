//! Plain-text sales report of a batch's hot leads.

use std::fmt::Write as _;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use leadscout_core::{DeepAnalysis, LeadRecord, ScoredLead, Tier};
use leadscout_scoring::report_order;

use crate::artifact::create_unique;
use crate::error::OutputError;

const REPORT_PREFIX: &str = "sales_report";
const RULE: &str =
    "================================================================================";
const DIVIDER: &str =
    "--------------------------------------------------------------------------------";

/// Hot records in report order.
#[must_use]
pub fn hot_records(records: &[LeadRecord]) -> Vec<&LeadRecord> {
    let mut hot: Vec<&LeadRecord> = records
        .iter()
        .filter(|r| r.scored().tier == Tier::Hot)
        .collect();
    hot.sort_by(|a, b| report_order(a.scored(), b.scored()));
    hot
}

/// Opening line for a cold call to `lead`.
#[must_use]
pub fn call_script(lead: &ScoredLead) -> String {
    let focus = if lead.audit.page_load_seconds.is_some_and(|s| s > 3.0) {
        "your slow page speed"
    } else if lead.audit.markup.is_some_and(|m| !m.has_structured_data) {
        "how your business shows up in local search"
    } else {
        "a few quick fixes"
    };
    format!(
        "Hi, this is [YOUR NAME]. I was doing some research on {} in {} and came across {}. \
I noticed a few things on your website that might be costing you customers, specifically {focus}. \
Do you have a couple minutes to discuss how we could fix this?",
        lead.lead.industry, lead.lead.locality, lead.lead.name
    )
}

/// Render the report body.
#[must_use]
pub fn render_report(
    records: &[LeadRecord],
    localities: &[String],
    generated_at: DateTime<Utc>,
) -> String {
    let hot = hot_records(records);
    let mut out = String::new();

    let _ = writeln!(out, "SEO SALES INTELLIGENCE REPORT");
    let _ = writeln!(out, "Locations: {}", localities.join("; "));
    let _ = writeln!(out, "Generated: {}", generated_at.format("%Y-%m-%d %H:%M UTC"));
    let _ = writeln!(out, "Leads analysed: {}", records.len());
    let _ = writeln!(out, "Hot leads: {}", hot.len());
    let _ = writeln!(out, "{RULE}");

    if hot.is_empty() {
        let _ = writeln!(out, "\nNo hot leads in this batch.");
        return out;
    }

    for (rank, record) in hot.iter().enumerate() {
        let _ = writeln!(out);
        write_lead(&mut out, rank + 1, record.scored());
        if let Some(analysis) = record.deep_analysis() {
            write_analysis(&mut out, analysis);
        }
        let _ = writeln!(out, "    Opening script:");
        let _ = writeln!(out, "      \"{}\"", call_script(record.scored()));
        let _ = writeln!(out, "{DIVIDER}");
    }
    out
}

fn write_lead(out: &mut String, rank: usize, lead: &ScoredLead) {
    let _ = writeln!(out, "#{rank}  {}  (score {}, {})", lead.lead.name, lead.score, lead.tier);
    let _ = writeln!(
        out,
        "    Industry: {} | Location: {}",
        lead.lead.industry, lead.lead.locality
    );
    let _ = writeln!(out, "    Website: {}", lead.lead.website().unwrap_or("none"));
    let _ = writeln!(
        out,
        "    Phone: {}",
        lead.lead.phone.as_deref().unwrap_or("not listed")
    );
    let lcp = lead
        .audit
        .page_load_seconds
        .map_or_else(|| "n/a".to_string(), |s| format!("{s:.1}s"));
    let _ = writeln!(
        out,
        "    Page load (LCP): {lcp} | Tech stack: {}",
        lead.audit.tech_stack_label()
    );
    write_list(out, "Issues", &lead.audit.issues);
}

fn write_analysis(out: &mut String, analysis: &DeepAnalysis) {
    if let Some(score) = analysis.seo_score {
        let _ = writeln!(out, "    SEO health: {score}/100");
    }
    if let Some(impact) = &analysis.revenue_impact {
        let _ = writeln!(out, "    Estimated revenue impact: {impact}");
    }
    write_list(out, "Critical issues", &analysis.critical_issues);
    write_list(out, "Opportunities", &analysis.opportunities);
    write_list(out, "Services offered", &analysis.services_offered);
    if let Some(usp) = &analysis.unique_selling_proposition {
        let _ = writeln!(out, "    USP: {usp}");
    }
    if let Some(cta) = &analysis.cta_quality {
        let _ = writeln!(out, "    Call-to-action: {cta}");
    }
    write_list(out, "Keywords targeted", &analysis.target_keywords);
    write_list(out, "Keywords missing", &analysis.missing_keywords);
    if let Some(quality) = &analysis.content_quality {
        let _ = writeln!(out, "    Content: {quality}");
    }
    write_list(out, "Quick wins", &analysis.quick_wins);
    if let Some(pitch) = &analysis.pitch_angle {
        let _ = writeln!(out, "    Pitch: {pitch}");
    }
}

fn write_list(out: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "    {title}:");
    for item in items {
        let _ = writeln!(out, "      - {item}");
    }
}

/// Write the report as `sales_report_<YYYYMMDD_HHMMSS>.txt` in `dir`.
///
/// # Errors
///
/// Returns [`OutputError::Io`] if the file cannot be created or written.
pub fn write_report(
    dir: &Path,
    records: &[LeadRecord],
    localities: &[String],
    generated_at: DateTime<Utc>,
) -> Result<PathBuf, OutputError> {
    let body = render_report(records, localities, generated_at);
    let (path, mut file) = create_unique(dir, REPORT_PREFIX, generated_at, "txt")?;
    file.write_all(body.as_bytes())
        .map_err(|e| OutputError::io(&path, e))?;
    tracing::info!(path = %path.display(), "sales report written");
    Ok(path)
}
