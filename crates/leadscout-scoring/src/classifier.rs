//! Tier classification and report ordering.

use std::cmp::Ordering;

use leadscout_core::{ScoredLead, Tier};

/// Minimum score for a Hot lead.
pub const HOT_THRESHOLD: u8 = 60;
/// Minimum score for a Warm lead.
pub const WARM_THRESHOLD: u8 = 40;

/// Bucket a score into a tier: `>= 60` Hot, `40..60` Warm, below 40 Cold.
#[must_use]
pub fn classify(score: u8) -> Tier {
    if score >= HOT_THRESHOLD {
        Tier::Hot
    } else if score >= WARM_THRESHOLD {
        Tier::Warm
    } else {
        Tier::Cold
    }
}

/// Ordering used everywhere leads are presented: score descending, then
/// business name ascending.
#[must_use]
pub fn report_order(a: &ScoredLead, b: &ScoredLead) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.lead.name.cmp(&b.lead.name))
}

/// Hot leads only, in report order.
#[must_use]
pub fn rank_hot_leads(leads: &[ScoredLead]) -> Vec<&ScoredLead> {
    let mut hot: Vec<&ScoredLead> = leads.iter().filter(|l| l.tier == Tier::Hot).collect();
    hot.sort_by(|a, b| report_order(a, b));
    hot
}

/// Sort any set of leads in report order, regardless of tier.
pub fn sort_for_report(leads: &mut [ScoredLead]) {
    leads.sort_by(report_order);
}
