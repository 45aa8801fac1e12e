/// Thresholds and point weights for lead scoring.
///
/// Each deficiency's contribution is capped, and no single cap reaches the
/// Hot threshold of 60.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    /// Points per percentage point of traffic decline.
    pub traffic_points_per_pct: f64,
    pub traffic_cap: f64,
    pub missing_schema_points: f64,
    pub stale_after_months: u32,
    pub stale_base_points: f64,
    pub stale_points_per_month: f64,
    pub stale_cap: f64,
    pub slow_lcp_seconds: f64,
    pub slow_base_points: f64,
    pub slow_points_per_second: f64,
    pub slow_cap: f64,
    pub generic_platform_points: f64,
    /// Templated platforms, matched case-insensitively.
    pub generic_platforms: Vec<String>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            traffic_points_per_pct: 1.0,
            traffic_cap: 30.0,
            missing_schema_points: 20.0,
            stale_after_months: 12,
            stale_base_points: 10.0,
            stale_points_per_month: 1.0,
            stale_cap: 20.0,
            slow_lcp_seconds: 3.0,
            slow_base_points: 10.0,
            slow_points_per_second: 5.0,
            slow_cap: 25.0,
            generic_platform_points: 5.0,
            generic_platforms: [
                "WordPress",
                "Wix",
                "Squarespace",
                "Weebly",
                "GoDaddy",
                "Shopify",
                "Webflow",
                "Joomla",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
        }
    }
}

impl ScoringConfig {
    #[must_use]
    pub fn is_generic_platform(&self, tech_stack: &str) -> bool {
        let stack = tech_stack.trim();
        self.generic_platforms
            .iter()
            .any(|p| p.eq_ignore_ascii_case(stack))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_platform_match_ignores_case() {
        let cfg = ScoringConfig::default();
        assert!(cfg.is_generic_platform("wordpress"));
        assert!(cfg.is_generic_platform(" Wix "));
        assert!(!cfg.is_generic_platform("Custom"));
        assert!(!cfg.is_generic_platform("Unknown"));
    }
}
