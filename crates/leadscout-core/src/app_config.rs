use std::path::PathBuf;

use crate::ConfigError;

#[derive(Clone)]
pub struct AppConfig {
    pub places_api_key: Option<String>,
    pub pagespeed_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub analysis_model: String,
    pub dataforseo_login: Option<String>,
    pub dataforseo_password: Option<String>,
    pub slack_webhook_url: Option<String>,
    pub output_dir: PathBuf,
    pub automation_path: PathBuf,
    pub log_level: String,
    pub max_industries: usize,
    pub leads_per_industry: usize,
    pub max_concurrent_leads: usize,
    pub site_timeout_secs: u64,
    pub pagespeed_timeout_secs: u64,
    pub discovery_timeout_secs: u64,
    pub analysis_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

impl AppConfig {
    /// The Places key, which every discovery run needs.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `GOOGLE_PLACES_API_KEY` is unset.
    pub fn require_places_key(&self) -> Result<&str, ConfigError> {
        self.places_api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("GOOGLE_PLACES_API_KEY".to_string()))
    }

    /// DataForSEO credentials, when both halves are configured.
    #[must_use]
    pub fn dataforseo_credentials(&self) -> Option<(&str, &str)> {
        match (&self.dataforseo_login, &self.dataforseo_password) {
            (Some(login), Some(password)) => Some((login.as_str(), password.as_str())),
            _ => None,
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[redacted]");
        f.debug_struct("AppConfig")
            .field("places_api_key", &redact(&self.places_api_key))
            .field("pagespeed_api_key", &redact(&self.pagespeed_api_key))
            .field("anthropic_api_key", &redact(&self.anthropic_api_key))
            .field("analysis_model", &self.analysis_model)
            .field("dataforseo_login", &self.dataforseo_login)
            .field("dataforseo_password", &redact(&self.dataforseo_password))
            .field("slack_webhook_url", &redact(&self.slack_webhook_url))
            .field("output_dir", &self.output_dir)
            .field("automation_path", &self.automation_path)
            .field("log_level", &self.log_level)
            .field("max_industries", &self.max_industries)
            .field("leads_per_industry", &self.leads_per_industry)
            .field("max_concurrent_leads", &self.max_concurrent_leads)
            .field("site_timeout_secs", &self.site_timeout_secs)
            .field("pagespeed_timeout_secs", &self.pagespeed_timeout_secs)
            .field("discovery_timeout_secs", &self.discovery_timeout_secs)
            .field("analysis_timeout_secs", &self.analysis_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .finish()
    }
}
