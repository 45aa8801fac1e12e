//! Client for the Google PageSpeed Insights v5 API.
//!
//! One request per URL, mobile strategy, performance category only. The
//! response is reduced to Largest Contentful Paint and the Lighthouse
//! performance score.

use std::time::Duration;

use async_trait::async_trait;
use leadscout_core::retry_with_backoff;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use crate::error::AuditError;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/pagespeedonline/v5/";

/// Speed figures extracted from one PageSpeed run.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpeedReport {
    pub lcp_seconds: Option<f64>,
    pub performance_score: Option<u8>,
}

/// Anything that can measure page speed for a URL.
#[async_trait]
pub trait SpeedMeasurement: Send + Sync {
    async fn measure(&self, url: &str) -> Result<SpeedReport, AuditError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PsiResponse {
    lighthouse_result: Option<LighthouseResult>,
}

#[derive(Debug, Deserialize)]
struct LighthouseResult {
    #[serde(default)]
    categories: Categories,
    #[serde(default)]
    audits: Audits,
}

#[derive(Debug, Default, Deserialize)]
struct Categories {
    performance: Option<Category>,
}

#[derive(Debug, Deserialize)]
struct Category {
    score: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct Audits {
    #[serde(rename = "largest-contentful-paint")]
    largest_contentful_paint: Option<AuditValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuditValue {
    /// Milliseconds.
    numeric_value: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PsiErrorEnvelope {
    error: PsiErrorBody,
}

#[derive(Debug, Deserialize)]
struct PsiErrorBody {
    message: String,
}

/// PageSpeed Insights client.
///
/// Use [`PageSpeedClient::new`] for production or
/// [`PageSpeedClient::with_base_url`] to point at a mock server in tests.
pub struct PageSpeedClient {
    client: Client,
    api_key: Option<String>,
    endpoint: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl PageSpeedClient {
    /// # Errors
    ///
    /// Returns [`AuditError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(
        api_key: Option<&str>,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, AuditError> {
        Self::with_base_url(api_key, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`AuditError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`AuditError::InvalidUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: Option<&str>,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, AuditError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/runPagespeed", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&normalised).map_err(|e| AuditError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.map(str::to_string),
            endpoint,
            max_retries: 0,
            backoff_base_ms: 0,
        })
    }

    /// Retry transient failures (timeouts, 429, 5xx) up to `max_retries` times.
    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    fn build_url(&self, target: &str) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("url", target);
            pairs.append_pair("category", "performance");
            pairs.append_pair("strategy", "mobile");
            if let Some(key) = &self.api_key {
                pairs.append_pair("key", key);
            }
        }
        url
    }

    async fn fetch_once(&self, url: &Url, target: &str) -> Result<SpeedReport, AuditError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                return Err(AuditError::UnexpectedStatus {
                    status: status.as_u16(),
                    url: target.to_string(),
                });
            }
            let message = serde_json::from_str::<PsiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("HTTP {}", status.as_u16()));
            return Err(AuditError::PageSpeedApi(message));
        }

        let parsed: PsiResponse =
            serde_json::from_str(&body).map_err(|e| AuditError::Deserialize {
                context: format!("runPagespeed(url={target})"),
                source: e,
            })?;
        Ok(extract_report(parsed))
    }
}

#[async_trait]
impl SpeedMeasurement for PageSpeedClient {
    async fn measure(&self, url: &str) -> Result<SpeedReport, AuditError> {
        let request_url = self.build_url(url);
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.fetch_once(&request_url, url)
        })
        .await
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn extract_report(response: PsiResponse) -> SpeedReport {
    let Some(lighthouse) = response.lighthouse_result else {
        return SpeedReport::default();
    };

    let lcp_seconds = lighthouse
        .audits
        .largest_contentful_paint
        .and_then(|a| a.numeric_value)
        .filter(|ms| ms.is_finite() && *ms >= 0.0)
        .map(|ms| ms / 1000.0);

    let performance_score = lighthouse
        .categories
        .performance
        .and_then(|c| c.score)
        .filter(|s| s.is_finite())
        .map(|s| (s * 100.0).round().clamp(0.0, 100.0) as u8);

    SpeedReport {
        lcp_seconds,
        performance_score,
    }
}
