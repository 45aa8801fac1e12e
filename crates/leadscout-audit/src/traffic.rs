//! Organic traffic trend providers.
//!
//! [`DataForSeoClient`] compares estimated organic traffic for the latest
//! month against three months earlier. [`NoTrafficSource`] is used when no
//! credentials are configured and always reports the trend as absent.

use std::time::Duration;

use async_trait::async_trait;
use leadscout_core::retry_with_backoff;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::AuditError;

const DEFAULT_BASE_URL: &str = "https://api.dataforseo.com/v3/";
const HISTORICAL_OVERVIEW_PATH: &str = "dataforseo_labs/google/historical_rank_overview/live";
/// DataForSEO success code, both for the envelope and per task.
const STATUS_OK: u32 = 20000;
/// United States.
const DEFAULT_LOCATION_CODE: u32 = 2840;

/// Signed percent change in organic traffic over roughly 90 days.
#[async_trait]
pub trait TrafficSource: Send + Sync {
    async fn traffic_trend(&self, domain: &str) -> Result<Option<f64>, AuditError>;
}

/// Traffic source that never has data.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTrafficSource;

#[async_trait]
impl TrafficSource for NoTrafficSource {
    async fn traffic_trend(&self, _domain: &str) -> Result<Option<f64>, AuditError> {
        Ok(None)
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    status_code: u32,
    #[serde(default)]
    status_message: String,
    #[serde(default)]
    tasks: Vec<Task>,
}

#[derive(Debug, Deserialize)]
struct Task {
    status_code: u32,
    #[serde(default)]
    status_message: String,
    #[serde(default)]
    result: Option<Vec<TaskResult>>,
}

#[derive(Debug, Deserialize)]
struct TaskResult {
    #[serde(default)]
    items: Option<Vec<MonthItem>>,
}

#[derive(Debug, Deserialize)]
struct MonthItem {
    year: i32,
    month: u32,
    metrics: Option<Metrics>,
}

#[derive(Debug, Deserialize)]
struct Metrics {
    organic: Option<OrganicMetrics>,
}

#[derive(Debug, Deserialize)]
struct OrganicMetrics {
    etv: Option<f64>,
}

/// DataForSEO Labs client (historical rank overview).
pub struct DataForSeoClient {
    client: Client,
    login: String,
    password: String,
    endpoint: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl DataForSeoClient {
    /// # Errors
    ///
    /// Returns [`AuditError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(login: &str, password: &str, timeout_secs: u64) -> Result<Self, AuditError> {
        Self::with_base_url(login, password, timeout_secs, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`AuditError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`AuditError::InvalidUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        login: &str,
        password: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, AuditError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        let endpoint = Url::parse(&format!(
            "{}/{HISTORICAL_OVERVIEW_PATH}",
            base_url.trim_end_matches('/')
        ))
        .map_err(|e| AuditError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            login: login.to_string(),
            password: password.to_string(),
            endpoint,
            max_retries: 0,
            backoff_base_ms: 0,
        })
    }

    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    async fn fetch_once(&self, domain: &str) -> Result<Envelope, AuditError> {
        let body = serde_json::json!([{
            "target": domain,
            "location_code": DEFAULT_LOCATION_CODE,
            "language_code": "en",
        }]);
        let response = self
            .client
            .post(self.endpoint.clone())
            .basic_auth(&self.login, Some(&self.password))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuditError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.endpoint.to_string(),
            });
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| AuditError::Deserialize {
            context: format!("historical_rank_overview(target={domain})"),
            source: e,
        })
    }
}

#[async_trait]
impl TrafficSource for DataForSeoClient {
    async fn traffic_trend(&self, domain: &str) -> Result<Option<f64>, AuditError> {
        let envelope = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.fetch_once(domain)
        })
        .await?;

        if envelope.status_code != STATUS_OK {
            return Err(AuditError::Traffic(envelope.status_message));
        }
        let Some(task) = envelope.tasks.into_iter().next() else {
            return Ok(None);
        };
        if task.status_code != STATUS_OK {
            return Err(AuditError::Traffic(task.status_message));
        }

        let items: Vec<MonthItem> = task
            .result
            .unwrap_or_default()
            .into_iter()
            .flat_map(|r| r.items.unwrap_or_default())
            .collect();
        Ok(trend_from_history(&items))
    }
}

/// Percent change between the latest month's organic ETV and the ETV three
/// months earlier. `None` when either month is missing or the baseline is 0.
fn trend_from_history(items: &[MonthItem]) -> Option<f64> {
    let etv = |item: &MonthItem| item.metrics.as_ref()?.organic.as_ref()?.etv;
    let month_index = |item: &MonthItem| item.year * 12 + i32::try_from(item.month).unwrap_or(0);

    let latest = items.iter().max_by_key(|i| month_index(*i))?;
    let target = month_index(latest) - 3;
    let baseline = items.iter().find(|i| month_index(*i) == target)?;

    let now = etv(latest)?;
    let before = etv(baseline)?;
    if before <= 0.0 {
        return None;
    }
    Some((now - before) / before * 100.0)
}

/// Host portion of a website URL, without a leading `www.`.
#[must_use]
pub fn domain_of(website: &str) -> Option<String> {
    let url = Url::parse(website).ok()?;
    let host = url.host_str()?;
    Some(host.strip_prefix("www.").unwrap_or(host).to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(year: i32, month: u32, etv: f64) -> MonthItem {
        MonthItem {
            year,
            month,
            metrics: Some(Metrics {
                organic: Some(OrganicMetrics { etv: Some(etv) }),
            }),
        }
    }

    #[test]
    fn trend_compares_against_three_months_back() {
        let items = vec![
            item(2026, 9, 750.0),
            item(2026, 8, 800.0),
            item(2026, 7, 900.0),
            item(2026, 6, 1000.0),
        ];
        let trend = trend_from_history(&items).unwrap();
        assert!((trend - -25.0).abs() < 1e-9);
    }

    #[test]
    fn trend_crosses_year_boundary() {
        let items = vec![item(2026, 1, 120.0), item(2025, 10, 100.0)];
        let trend = trend_from_history(&items).unwrap();
        assert!((trend - 20.0).abs() < 1e-9);
    }

    #[test]
    fn trend_needs_a_baseline() {
        assert_eq!(trend_from_history(&[item(2026, 9, 10.0)]), None);
        assert_eq!(
            trend_from_history(&[item(2026, 9, 10.0), item(2026, 6, 0.0)]),
            None
        );
    }

    #[test]
    fn domain_strips_www() {
        assert_eq!(
            domain_of("https://www.Example.com/path").as_deref(),
            Some("example.com")
        );
        assert_eq!(domain_of("nonsense"), None);
    }

    #[tokio::test]
    async fn no_traffic_source_reports_nothing() {
        assert_eq!(NoTrafficSource.traffic_trend("example.com").await.unwrap(), None);
    }
}
