mod app_config;
mod automation;
mod config;
pub mod retry;
mod scoring_config;
pub mod types;

use thiserror::Error;

pub use app_config::AppConfig;
pub use automation::{
    load_automation, split_industries, AutomationConfig, AutomationFile, IndustrySelection,
    Schedule, Weekday,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use retry::{retry_with_backoff, Retriable};
pub use scoring_config::ScoringConfig;
pub use types::{
    AuditSignals, DeepAnalysis, IndustryMode, LeadRecord, MarkupChecks, RawLead, ScoredLead, Tier,
    NO_WEBSITE_ISSUE, UNKNOWN_TECH_STACK,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read automation file {path}: {source}")]
    AutomationFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse automation file: {0}")]
    AutomationFileParse(#[from] serde_yaml::Error),

    #[error("invalid automation config: {0}")]
    Validation(String),
}
