//! Deep-analysis client backed by the Anthropic Messages API.

use std::time::Duration;

use leadscout_audit::fetch_homepage;
use leadscout_core::{retry_with_backoff, DeepAnalysis};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Url;

use crate::error::AnalysisError;
use crate::prompt::{build_prompt, page_text, parse_analysis, SYSTEM_PROMPT};
use crate::types::{ChatRequest, ChatResponse, WireMessage};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 2048;

pub struct AnalysisClient {
    http: reqwest::Client,
    headers: HeaderMap,
    model: String,
    messages_url: Url,
    user_agent: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl AnalysisClient {
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidApiKey`] if the key is not a valid
    /// header value, or [`AnalysisError::Http`] if the client cannot be built.
    pub fn new(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, AnalysisError> {
        Self::with_base_url(api_key, model, timeout_secs, user_agent, ANTHROPIC_API_URL)
    }

    /// # Errors
    ///
    /// As [`AnalysisClient::new`], plus [`AnalysisError::InvalidBaseUrl`].
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, AnalysisError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(api_key).map_err(|_| AnalysisError::InvalidApiKey)?,
        );
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let messages_url = Url::parse(&format!("{}/messages", base_url.trim_end_matches('/')))
            .map_err(|e| AnalysisError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            headers,
            model: model.to_string(),
            messages_url,
            user_agent: user_agent.to_string(),
            max_retries: 0,
            backoff_base_ms: 0,
        })
    }

    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Fetch `url` and ask the model for a sales-oriented analysis.
    ///
    /// # Errors
    ///
    /// - [`AnalysisError::PageFetch`] if the homepage cannot be fetched.
    /// - [`AnalysisError::Api`] / [`AnalysisError::Http`] on API failure.
    /// - [`AnalysisError::Deserialize`] if the answer is not usable JSON.
    pub async fn analyze(
        &self,
        url: &str,
        name: &str,
        industry: &str,
    ) -> Result<DeepAnalysis, AnalysisError> {
        let page = fetch_homepage(&self.http, url, &self.user_agent)
            .await
            .map_err(|e| AnalysisError::PageFetch(e.to_string()))?;
        self.analyze_text(url, name, industry, &page_text(&page.body))
            .await
    }

    /// Analyse already-extracted page text.
    ///
    /// # Errors
    ///
    /// As [`AnalysisClient::analyze`], minus the page fetch.
    pub async fn analyze_text(
        &self,
        url: &str,
        name: &str,
        industry: &str,
        text: &str,
    ) -> Result<DeepAnalysis, AnalysisError> {
        let request = ChatRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            messages: vec![WireMessage::user(build_prompt(name, industry, url, text))],
            system: Some(SYSTEM_PROMPT.to_string()),
            temperature: Some(0.2),
        };

        tracing::debug!(model = %self.model, website = url, "deep analysis request");
        let response = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.chat(&request)
        })
        .await?;

        let text = response.text();
        if text.trim().is_empty() {
            return Err(AnalysisError::EmptyResponse);
        }
        parse_analysis(&text)
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AnalysisError> {
        let response = self
            .http
            .post(self.messages_url.clone())
            .headers(self.headers.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AnalysisError::Api {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body).map_err(|e| AnalysisError::Deserialize {
            context: "messages response".to_string(),
            source: e,
        })
    }
}
