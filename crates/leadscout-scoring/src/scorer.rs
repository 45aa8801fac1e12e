//! Additive deficiency scorer.
//!
//! Each observed deficiency adds points to a running total which is rounded
//! and clamped to `[0, 100]`. Absent signals add nothing, so a lead with no
//! measurable data scores 0.

use leadscout_core::{AuditSignals, RawLead, ScoredLead, ScoringConfig};

use crate::classifier::classify;

/// Score a lead from its audit signals.
///
/// Pure and total: every combination of present and absent fields yields a
/// value in `[0, 100]`. Leads without a website score 0. Only
/// `page_load_seconds` is scored for speed; `performance_score` is ignored.
#[must_use]
pub fn score_lead(lead: &RawLead, audit: &AuditSignals, config: &ScoringConfig) -> u8 {
    if lead.website().is_none() {
        return 0;
    }

    let mut points = 0.0_f64;
    points += traffic_points(audit.traffic_trend_90d, config);
    points += schema_points(audit, config);
    points += staleness_points(audit.content_freshness_months, config);
    points += slow_page_points(audit.page_load_seconds, config);
    points += platform_points(audit.detected_tech_stack.as_deref(), config);

    clamp_score(points)
}

/// Score and classify in one step, producing the immutable output unit.
#[must_use]
pub fn score_and_classify(lead: RawLead, audit: AuditSignals, config: &ScoringConfig) -> ScoredLead {
    let score = score_lead(&lead, &audit, config);
    ScoredLead {
        lead,
        audit,
        score,
        tier: classify(score),
    }
}

fn traffic_points(trend: Option<f64>, config: &ScoringConfig) -> f64 {
    match trend {
        Some(t) if t < 0.0 => (-t * config.traffic_points_per_pct).min(config.traffic_cap),
        _ => 0.0,
    }
}

fn schema_points(audit: &AuditSignals, config: &ScoringConfig) -> f64 {
    match audit.markup {
        Some(m) if !m.has_structured_data => config.missing_schema_points,
        _ => 0.0,
    }
}

fn staleness_points(months: Option<u32>, config: &ScoringConfig) -> f64 {
    match months {
        Some(m) if m > config.stale_after_months => {
            let beyond = f64::from(m - config.stale_after_months);
            (config.stale_base_points + beyond * config.stale_points_per_month)
                .min(config.stale_cap)
        }
        _ => 0.0,
    }
}

fn slow_page_points(lcp: Option<f64>, config: &ScoringConfig) -> f64 {
    match lcp {
        Some(secs) if secs > config.slow_lcp_seconds => {
            let beyond = secs - config.slow_lcp_seconds;
            (config.slow_base_points + beyond * config.slow_points_per_second).min(config.slow_cap)
        }
        _ => 0.0,
    }
}

fn platform_points(tech_stack: Option<&str>, config: &ScoringConfig) -> f64 {
    match tech_stack {
        Some(stack) if config.is_generic_platform(stack) => config.generic_platform_points,
        _ => 0.0,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_score(points: f64) -> u8 {
    if !points.is_finite() {
        return 0;
    }
    points.round().clamp(0.0, 100.0) as u8
}
