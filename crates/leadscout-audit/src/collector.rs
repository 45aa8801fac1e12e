//! Fail-soft aggregation of per-website audit signals.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use leadscout_core::{AppConfig, AuditSignals};

use crate::error::AuditError;
use crate::fetch::{fetch_homepage, normalize_website, Homepage};
use crate::freshness::content_freshness_months;
use crate::markup::check_markup;
use crate::pagespeed::{PageSpeedClient, SpeedMeasurement, SpeedReport};
use crate::speed_cache::SpeedCache;
use crate::tech::detect_tech_stack;
use crate::traffic::{domain_of, DataForSeoClient, NoTrafficSource, TrafficSource};

pub const SITE_UNREACHABLE_ISSUE: &str = "site unreachable";
pub const SLOW_LCP_ISSUE: &str = "Slow LCP";
pub const NO_SCHEMA_ISSUE: &str = "No Schema.org markup";
pub const STALE_CONTENT_ISSUE: &str = "Stale Content";
pub const TRAFFIC_DECLINE_ISSUE: &str = "Traffic Decline";

const SLOW_LCP_SECONDS: f64 = 3.0;
const STALE_AFTER_MONTHS: u32 = 12;
const TRAFFIC_DECLINE_PCT: f64 = -10.0;

#[derive(Debug, Clone)]
pub struct AuditorOptions {
    pub site_timeout: Duration,
    pub pagespeed_timeout: Duration,
    pub user_agent: String,
}

impl AuditorOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            site_timeout: Duration::from_secs(config.site_timeout_secs),
            pagespeed_timeout: Duration::from_secs(config.pagespeed_timeout_secs),
            user_agent: config.user_agent.clone(),
        }
    }
}

/// Collects [`AuditSignals`] for one website at a time.
///
/// Never fails: every measurement that cannot be taken is left absent and
/// described in the issue list.
pub struct SiteAuditor {
    client: reqwest::Client,
    speed: Arc<dyn SpeedMeasurement>,
    traffic: Arc<dyn TrafficSource>,
    options: AuditorOptions,
}

impl SiteAuditor {
    /// # Errors
    ///
    /// Returns [`AuditError::Http`] if the homepage HTTP client cannot be built.
    pub fn new(
        speed: Arc<dyn SpeedMeasurement>,
        traffic: Arc<dyn TrafficSource>,
        options: AuditorOptions,
    ) -> Result<Self, AuditError> {
        let client = reqwest::Client::builder()
            .timeout(options.site_timeout)
            .connect_timeout(Duration::from_secs(10))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;
        Ok(Self {
            client,
            speed,
            traffic,
            options,
        })
    }

    /// Production wiring: PageSpeed behind a single-flight cache, DataForSEO
    /// when credentials are configured.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError`] if any HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, AuditError> {
        let pagespeed = PageSpeedClient::new(
            config.pagespeed_api_key.as_deref(),
            config.pagespeed_timeout_secs,
            &config.user_agent,
        )?
        .with_retry(config.max_retries, config.retry_backoff_ms);
        let speed: Arc<dyn SpeedMeasurement> = Arc::new(SpeedCache::new(Arc::new(pagespeed)));

        let traffic: Arc<dyn TrafficSource> = match config.dataforseo_credentials() {
            Some((login, password)) => Arc::new(
                DataForSeoClient::new(login, password, config.site_timeout_secs)?
                    .with_retry(config.max_retries, config.retry_backoff_ms),
            ),
            None => Arc::new(NoTrafficSource),
        };

        Self::new(speed, traffic, AuditorOptions::from_config(config))
    }

    /// Audit one website. `None`, blank or malformed input yields
    /// [`AuditSignals::no_website`].
    pub async fn collect(&self, website: Option<&str>) -> AuditSignals {
        let Some(raw) = website.map(str::trim).filter(|w| !w.is_empty()) else {
            return AuditSignals::no_website();
        };
        let url = match normalize_website(raw) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!(website = raw, error = %e, "treating malformed website as missing");
                return AuditSignals::no_website();
            }
        };

        let (speed, homepage, traffic) = tokio::join!(
            self.measure_speed(&url),
            self.fetch_page(&url),
            self.traffic_trend(&url),
        );

        let mut signals = AuditSignals::default();

        match homepage {
            Ok(page) => {
                signals.markup = Some(check_markup(&page.body));
                signals.detected_tech_stack = detect_tech_stack(&page);
                signals.content_freshness_months = content_freshness_months(&page, Utc::now());
            }
            Err(e) => {
                tracing::warn!(website = %url, error = %e, "homepage fetch failed");
                signals.issues.push(SITE_UNREACHABLE_ISSUE.to_string());
                signals.degraded = true;
            }
        }

        match speed {
            Ok(report) => {
                signals.page_load_seconds = report.lcp_seconds;
                signals.performance_score = report.performance_score;
            }
            Err(reason) => {
                tracing::warn!(website = %url, error = %reason, "page speed unavailable");
                signals
                    .issues
                    .push(format!("page speed unavailable: {reason}"));
                signals.degraded = true;
            }
        }

        match traffic {
            Ok(trend) => signals.traffic_trend_90d = trend,
            Err(e) => {
                tracing::warn!(website = %url, error = %e, "traffic trend unavailable");
                signals.issues.push(format!("traffic trend unavailable: {e}"));
                signals.degraded = true;
            }
        }

        push_threshold_issues(&mut signals);
        signals
    }

    async fn measure_speed(&self, url: &str) -> Result<SpeedReport, String> {
        match tokio::time::timeout(self.options.pagespeed_timeout, self.speed.measure(url)).await {
            Ok(Ok(report)) => Ok(report),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!(
                "timed out after {}s",
                self.options.pagespeed_timeout.as_secs()
            )),
        }
    }

    async fn fetch_page(&self, url: &str) -> Result<Homepage, String> {
        let fetch = fetch_homepage(&self.client, url, &self.options.user_agent);
        match tokio::time::timeout(self.options.site_timeout, fetch).await {
            Ok(Ok(page)) => Ok(page),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!(
                "timed out after {}s",
                self.options.site_timeout.as_secs()
            )),
        }
    }

    async fn traffic_trend(&self, url: &str) -> Result<Option<f64>, AuditError> {
        let Some(domain) = domain_of(url) else {
            return Ok(None);
        };
        self.traffic.traffic_trend(&domain).await
    }
}

/// Append the fixed-threshold issue strings for measured signals.
pub fn push_threshold_issues(signals: &mut AuditSignals) {
    if signals.page_load_seconds.is_some_and(|s| s > SLOW_LCP_SECONDS) {
        signals.issues.push(SLOW_LCP_ISSUE.to_string());
    }
    if signals.markup.is_some_and(|m| !m.has_structured_data) {
        signals.issues.push(NO_SCHEMA_ISSUE.to_string());
    }
    if signals
        .content_freshness_months
        .is_some_and(|m| m > STALE_AFTER_MONTHS)
    {
        signals.issues.push(STALE_CONTENT_ISSUE.to_string());
    }
    if signals
        .traffic_trend_90d
        .is_some_and(|t| t < TRAFFIC_DECLINE_PCT)
    {
        signals.issues.push(TRAFFIC_DECLINE_ISSUE.to_string());
    }
}
