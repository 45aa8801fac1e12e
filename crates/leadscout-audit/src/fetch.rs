//! Homepage fetching for markup, platform and freshness inspection.

use reqwest::header::{HeaderMap, ACCEPT, USER_AGENT};

use crate::error::AuditError;

const BROWSER_FALLBACK_UA: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Headers kept from the homepage response, names lowercased.
const KEPT_HEADERS: &[&str] = &[
    "last-modified",
    "server",
    "x-powered-by",
    "x-generator",
    "x-shopid",
    "x-shopify-stage",
    "x-wix-request-id",
    "x-served-by",
    "link",
];

/// A fetched homepage: its HTML body plus the response headers the
/// fingerprinting and freshness checks care about.
#[derive(Debug, Clone, Default)]
pub struct Homepage {
    pub body: String,
    pub headers: Vec<(String, String)>,
}

impl Homepage {
    /// First value of a kept header, matched case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Normalise a listing's website into an absolute `http(s)` URL.
///
/// # Errors
///
/// Returns [`AuditError::InvalidUrl`] if the value cannot be made into a URL
/// with a host.
pub fn normalize_website(raw: &str) -> Result<String, AuditError> {
    let trimmed = raw.trim();
    let candidate = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let url = reqwest::Url::parse(&candidate).map_err(|e| AuditError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    match url.host_str() {
        Some(host) if host.contains('.') => Ok(url.to_string()),
        _ => Err(AuditError::InvalidUrl {
            url: raw.to_string(),
            reason: "missing host".to_string(),
        }),
    }
}

/// Fetch the homepage HTML, trying the configured user-agent first and then a
/// browser user-agent for sites that reject bots.
///
/// # Errors
///
/// Returns [`AuditError::Http`] on network failure, or
/// [`AuditError::UnexpectedStatus`] when every attempt returns non-2xx.
pub async fn fetch_homepage(
    client: &reqwest::Client,
    url: &str,
    user_agent: &str,
) -> Result<Homepage, AuditError> {
    let mut user_agents = vec![user_agent.to_string()];
    if user_agent != BROWSER_FALLBACK_UA {
        user_agents.push(BROWSER_FALLBACK_UA.to_string());
    }

    let mut last_status = None;
    for ua in user_agents {
        let response = client
            .get(url)
            .header(USER_AGENT, &ua)
            .header(ACCEPT, "text/html,application/xhtml+xml")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(url, status = status.as_u16(), ua = %ua, "homepage fetch rejected");
            last_status = Some(status.as_u16());
            continue;
        }

        let headers = kept_headers(response.headers());
        let body = response.text().await?;
        return Ok(Homepage { body, headers });
    }

    Err(AuditError::UnexpectedStatus {
        status: last_status.unwrap_or(0),
        url: url.to_string(),
    })
}

fn kept_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    KEPT_HEADERS
        .iter()
        .filter_map(|name| {
            let value = headers.get(*name)?.to_str().ok()?;
            Some(((*name).to_string(), value.to_string()))
        })
        .collect()
}
