use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid value in column {column}: {reason}")]
    InvalidColumn { column: String, reason: String },

    #[error("failed to serialize workflow: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("webhook returned HTTP {status}")]
    Webhook { status: u16 },
}

impl OutputError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
