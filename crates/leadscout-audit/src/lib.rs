//! Website audit signal collection.
//!
//! [`SiteAuditor`] gathers page speed, markup quality, platform, content
//! freshness and traffic trend for a single website. Each measurement fails
//! independently; the collector itself never fails.

pub mod collector;
pub mod error;
pub mod fetch;
pub mod freshness;
pub mod markup;
pub mod pagespeed;
pub mod speed_cache;
pub mod tech;
pub mod traffic;

pub use collector::{push_threshold_issues, AuditorOptions, SiteAuditor};
pub use error::AuditError;
pub use fetch::{fetch_homepage, normalize_website, Homepage};
pub use pagespeed::{PageSpeedClient, SpeedMeasurement, SpeedReport};
pub use speed_cache::SpeedCache;
pub use traffic::{DataForSeoClient, NoTrafficSource, TrafficSource};
