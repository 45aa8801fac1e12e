use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn build_app_config_succeeds_with_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).expect("defaults should be valid");
    assert!(cfg.places_api_key.is_none());
    assert!(cfg.anthropic_api_key.is_none());
    assert_eq!(cfg.analysis_model, "claude-3-haiku-20240307");
    assert_eq!(cfg.output_dir, PathBuf::from("./out"));
    assert_eq!(cfg.automation_path, PathBuf::from("./config.yaml"));
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.max_industries, 5);
    assert_eq!(cfg.leads_per_industry, 20);
    assert_eq!(cfg.max_concurrent_leads, 4);
    assert_eq!(cfg.site_timeout_secs, 15);
    assert_eq!(cfg.pagespeed_timeout_secs, 60);
    assert_eq!(cfg.discovery_timeout_secs, 20);
    assert_eq!(cfg.analysis_timeout_secs, 45);
    assert_eq!(cfg.user_agent, "leadscout/0.1 (seo-audit)");
    assert_eq!(cfg.max_retries, 2);
    assert_eq!(cfg.retry_backoff_ms, 500);
}

#[test]
fn require_places_key_reports_missing_var() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let err = cfg.require_places_key().unwrap_err();
    assert!(
        matches!(err, ConfigError::MissingEnvVar(ref v) if v == "GOOGLE_PLACES_API_KEY"),
        "expected MissingEnvVar(GOOGLE_PLACES_API_KEY), got: {err:?}"
    );
}

#[test]
fn require_places_key_returns_configured_key() {
    let mut map = HashMap::new();
    map.insert("GOOGLE_PLACES_API_KEY", "places-key");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.require_places_key().unwrap(), "places-key");
}

#[test]
fn blank_keys_are_treated_as_unset() {
    let mut map = HashMap::new();
    map.insert("ANTHROPIC_API_KEY", "   ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.anthropic_api_key.is_none());
}

#[test]
fn dataforseo_credentials_need_both_halves() {
    let mut map = HashMap::new();
    map.insert("DATAFORSEO_LOGIN", "me@example.com");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.dataforseo_credentials().is_none());

    map.insert("DATAFORSEO_PASSWORD", "secret");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(
        cfg.dataforseo_credentials(),
        Some(("me@example.com", "secret"))
    );
}

#[test]
fn leads_per_industry_override() {
    let mut map = HashMap::new();
    map.insert("LEADS_PER_INDUSTRY", "5");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.leads_per_industry, 5);
}

#[test]
fn max_concurrent_leads_rejects_zero() {
    let mut map = HashMap::new();
    map.insert("LEADSCOUT_MAX_CONCURRENT_LEADS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "LEADSCOUT_MAX_CONCURRENT_LEADS"),
        "expected InvalidEnvVar(LEADSCOUT_MAX_CONCURRENT_LEADS), got: {result:?}"
    );
}

#[test]
fn pagespeed_timeout_invalid() {
    let mut map = HashMap::new();
    map.insert("LEADSCOUT_PAGESPEED_TIMEOUT_SECS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "LEADSCOUT_PAGESPEED_TIMEOUT_SECS"),
        "expected InvalidEnvVar(LEADSCOUT_PAGESPEED_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn debug_output_redacts_secrets() {
    let mut map = HashMap::new();
    map.insert("GOOGLE_PLACES_API_KEY", "super-secret-places");
    map.insert("SLACK_WEBHOOK_URL", "https://hooks.slack.com/services/T/B/X");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("super-secret-places"));
    assert!(!rendered.contains("hooks.slack.com"));
    assert!(rendered.contains("[redacted]"));
}
