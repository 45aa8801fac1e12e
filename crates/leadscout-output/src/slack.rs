//! Hot-lead alerts through a Slack incoming webhook.

use std::fmt::Write as _;
use std::time::Duration;

use leadscout_core::LeadRecord;
use serde::Serialize;

use crate::error::OutputError;
use crate::report::hot_records;

/// Leads listed in one alert.
pub const DEFAULT_TOP_N: usize = 5;

#[derive(Serialize)]
struct WebhookPayload<'a> {
    text: &'a str,
    unfurl_links: bool,
}

/// Alert text for the top `top_n` hot leads, or `None` when there are none.
#[must_use]
pub fn hot_lead_message(records: &[LeadRecord], localities: &[String], top_n: usize) -> Option<String> {
    let hot = hot_records(records);
    if hot.is_empty() {
        return None;
    }

    let mut text = format!(
        "*{} hot lead{}* found in {}",
        hot.len(),
        if hot.len() == 1 { "" } else { "s" },
        localities.join("; ")
    );
    for record in hot.iter().take(top_n) {
        let lead = record.scored();
        let _ = write!(
            text,
            "\n• {} ({}, score {})",
            lead.lead.name, lead.lead.industry, lead.score
        );
        if let Some(site) = lead.lead.website() {
            let _ = write!(text, " {site}");
        }
    }
    if hot.len() > top_n {
        let _ = write!(text, "\n…and {} more in the sales report", hot.len() - top_n);
    }
    Some(text)
}

pub struct SlackNotifier {
    http: reqwest::Client,
    webhook_url: String,
}

impl SlackNotifier {
    /// # Errors
    ///
    /// Returns [`OutputError::Http`] if the HTTP client cannot be built.
    pub fn new(webhook_url: &str, timeout_secs: u64) -> Result<Self, OutputError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            http,
            webhook_url: webhook_url.to_string(),
        })
    }

    /// Post `text` to the webhook.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::Http`] on transport failure or
    /// [`OutputError::Webhook`] on a non-2xx answer.
    pub async fn post(&self, text: &str) -> Result<(), OutputError> {
        let response = self
            .http
            .post(&self.webhook_url)
            .json(&WebhookPayload {
                text,
                unfurl_links: false,
            })
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(OutputError::Webhook {
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    /// Alert on the batch's hot leads. Failures are logged, never returned.
    /// Returns whether an alert was delivered.
    pub async fn notify_hot_leads(&self, records: &[LeadRecord], localities: &[String]) -> bool {
        let Some(text) = hot_lead_message(records, localities, DEFAULT_TOP_N) else {
            tracing::debug!("no hot leads, skipping slack alert");
            return false;
        };
        match self.post(&text).await {
            Ok(()) => {
                tracing::info!("slack alert sent");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "slack alert failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use leadscout_core::{AuditSignals, RawLead, ScoredLead, Tier};

    use super::*;

    fn record(name: &str, score: u8, tier: Tier) -> LeadRecord {
        LeadRecord::Base(ScoredLead {
            lead: RawLead {
                name: name.to_string(),
                website: Some(format!("https://{}.example", name.to_lowercase())),
                phone: None,
                locality: "Austin, TX".to_string(),
                industry: "roofers".to_string(),
                details_error: None,
            },
            audit: AuditSignals::default(),
            score,
            tier,
        })
    }

    #[test]
    fn message_lists_top_hot_leads() {
        let records: Vec<LeadRecord> = (0..7)
            .map(|i| record(&format!("Roof{i}"), 60 + i, Tier::Hot))
            .chain(std::iter::once(record("Cool", 10, Tier::Cold)))
            .collect();
        let text = hot_lead_message(&records, &["Austin, TX".to_string()], 5).unwrap();
        assert!(text.starts_with("*7 hot leads* found in Austin, TX"));
        assert!(text.contains("• Roof6 (roofers, score 66) https://roof6.example"));
        assert!(!text.contains("Roof1 "));
        assert!(text.contains("…and 2 more"));
        assert!(!text.contains("Cool"));
    }

    #[test]
    fn no_hot_leads_no_message() {
        let records = vec![record("Cool", 10, Tier::Cold)];
        assert!(hot_lead_message(&records, &[], 5).is_none());
    }
}
