use std::path::PathBuf;

use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// API keys are all optional here; commands that need one ask for it through
/// accessors such as [`AppConfig::require_places_key`].
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        optional(var).unwrap_or_else(|| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_positive = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        let value = raw
            .parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })?;
        if value == 0 {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(value)
    };

    Ok(AppConfig {
        places_api_key: optional("GOOGLE_PLACES_API_KEY"),
        pagespeed_api_key: optional("PSI_API_KEY"),
        anthropic_api_key: optional("ANTHROPIC_API_KEY"),
        analysis_model: or_default("LEADSCOUT_ANALYSIS_MODEL", "claude-3-haiku-20240307"),
        dataforseo_login: optional("DATAFORSEO_LOGIN"),
        dataforseo_password: optional("DATAFORSEO_PASSWORD"),
        slack_webhook_url: optional("SLACK_WEBHOOK_URL"),
        output_dir: PathBuf::from(or_default("LEADSCOUT_OUTPUT_DIR", "./out")),
        automation_path: PathBuf::from(or_default("LEADSCOUT_AUTOMATION_PATH", "./config.yaml")),
        log_level: or_default("LEADSCOUT_LOG_LEVEL", "info"),
        max_industries: parse_positive("MAX_INDUSTRIES", "5")?,
        leads_per_industry: parse_positive("LEADS_PER_INDUSTRY", "20")?,
        max_concurrent_leads: parse_positive("LEADSCOUT_MAX_CONCURRENT_LEADS", "4")?,
        site_timeout_secs: parse_u64("LEADSCOUT_SITE_TIMEOUT_SECS", "15")?,
        pagespeed_timeout_secs: parse_u64("LEADSCOUT_PAGESPEED_TIMEOUT_SECS", "60")?,
        discovery_timeout_secs: parse_u64("LEADSCOUT_DISCOVERY_TIMEOUT_SECS", "20")?,
        analysis_timeout_secs: parse_u64("LEADSCOUT_ANALYSIS_TIMEOUT_SECS", "45")?,
        user_agent: or_default("LEADSCOUT_USER_AGENT", "leadscout/0.1 (seo-audit)"),
        max_retries: parse_u32("LEADSCOUT_MAX_RETRIES", "2")?,
        retry_backoff_ms: parse_u64("LEADSCOUT_RETRY_BACKOFF_MS", "500")?,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
