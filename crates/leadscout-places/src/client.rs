//! HTTP client for the Google Places Text Search and Place Details APIs.
//!
//! Text Search finds businesses for an `"<industry> in <locality>"` query;
//! Place Details then supplies each result's website and phone number. Every
//! response's `"status"` field is checked and non-OK statuses surface as
//! [`PlacesError::Api`].

use std::time::Duration;

use futures::stream::{self, StreamExt};
use leadscout_core::{retry_with_backoff, RawLead};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::PlacesError;

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place/";
const DETAIL_FIELDS: &str = "name,website,formatted_phone_number";
const DETAIL_CONCURRENCY: usize = 4;

#[derive(Debug, Deserialize)]
struct TextSearchResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<PlaceSummary>,
}

#[derive(Debug, Clone, Deserialize)]
struct PlaceSummary {
    name: String,
    place_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    result: Option<PlaceDetails>,
}

#[derive(Debug, Default, Deserialize)]
struct PlaceDetails {
    name: Option<String>,
    website: Option<String>,
    formatted_phone_number: Option<String>,
}

/// Client for the Places web service.
///
/// Use [`PlacesClient::new`] for production or [`PlacesClient::with_base_url`]
/// to point at a mock server in tests.
pub struct PlacesClient {
    client: Client,
    api_key: String,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl PlacesClient {
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(api_key: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, PlacesError> {
        Self::with_base_url(api_key, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`PlacesError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| PlacesError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url,
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

    /// Find up to `max_results` businesses for `industry` in `locality`.
    ///
    /// A failed details lookup keeps the business, with the failure carried
    /// in [`RawLead::details_error`].
    ///
    /// # Errors
    ///
    /// - [`PlacesError::InvalidQuery`] if `locality` or `industry` is blank.
    /// - [`PlacesError::Api`] if Text Search returns a non-OK status other
    ///   than `ZERO_RESULTS`.
    /// - [`PlacesError::Http`] / [`PlacesError::Deserialize`] on transport or
    ///   decoding failure.
    pub async fn search(
        &self,
        locality: &str,
        industry: &str,
        max_results: usize,
    ) -> Result<Vec<RawLead>, PlacesError> {
        let locality = locality.trim();
        let industry = industry.trim();
        if locality.is_empty() {
            return Err(PlacesError::InvalidQuery("locality is blank".to_string()));
        }
        if industry.is_empty() {
            return Err(PlacesError::InvalidQuery("industry is blank".to_string()));
        }

        let query = format!("{industry} in {locality}");
        let url = self.build_url("textsearch/json", &[("query", &query)]);
        let response: TextSearchResponse = self.get_json(&url, "textsearch").await?;

        match response.status.as_str() {
            "OK" => {}
            "ZERO_RESULTS" => return Ok(Vec::new()),
            _ => {
                return Err(PlacesError::Api {
                    status: response.status,
                    message: response.error_message.unwrap_or_default(),
                })
            }
        }

        let places: Vec<PlaceSummary> = response.results.into_iter().take(max_results).collect();
        let leads = stream::iter(places)
            .map(|place| self.lead_for(place, locality, industry))
            .buffered(DETAIL_CONCURRENCY)
            .collect::<Vec<_>>()
            .await;

        tracing::debug!(locality, industry, count = leads.len(), "places search complete");
        Ok(leads)
    }

    async fn lead_for(&self, place: PlaceSummary, locality: &str, industry: &str) -> RawLead {
        let (details, details_error) = match place.place_id.as_deref() {
            Some(id) => match self.details(id).await {
                Ok(details) => (details, None),
                Err(e) => {
                    tracing::warn!(place = %place.name, error = %e, "place details lookup failed");
                    (PlaceDetails::default(), Some(e.to_string()))
                }
            },
            None => (PlaceDetails::default(), None),
        };

        RawLead {
            name: details.name.unwrap_or(place.name),
            website: details.website.filter(|w| !w.trim().is_empty()),
            phone: details
                .formatted_phone_number
                .filter(|p| !p.trim().is_empty()),
            locality: locality.to_string(),
            industry: industry.to_string(),
            details_error,
        }
    }

    async fn details(&self, place_id: &str) -> Result<PlaceDetails, PlacesError> {
        let url = self.build_url(
            "details/json",
            &[("place_id", place_id), ("fields", DETAIL_FIELDS)],
        );
        let response: DetailsResponse = self.get_json(&url, "details").await?;
        if response.status != "OK" {
            return Err(PlacesError::Api {
                status: response.status,
                message: response.error_message.unwrap_or_default(),
            });
        }
        Ok(response.result.unwrap_or_default())
    }

    fn build_url(&self, endpoint: &str, extra: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(&format!("{}{endpoint}", self.base_url.path()));
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("key", &self.api_key);
        }
        url
    }

    /// GET with retries; transient `status` values inside a 200 body are
    /// retried as well.
    async fn get_json<T>(&self, url: &Url, context: &str) -> Result<T, PlacesError>
    where
        T: DeserializeOwned,
    {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || async {
            let response = self.client.get(url.clone()).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(PlacesError::UnexpectedStatus {
                    status: status.as_u16(),
                    url: context.to_string(),
                });
            }
            let body = response.text().await?;
            let value: serde_json::Value =
                serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize {
                    context: context.to_string(),
                    source: e,
                })?;
            if let Some(api_status) = value.get("status").and_then(serde_json::Value::as_str) {
                if api_status == "OVER_QUERY_LIMIT" || api_status == "UNKNOWN_ERROR" {
                    return Err(PlacesError::Api {
                        status: api_status.to_string(),
                        message: value
                            .get("error_message")
                            .and_then(serde_json::Value::as_str)
                            .unwrap_or_default()
                            .to_string(),
                    });
                }
            }
            serde_json::from_value(value).map_err(|e| PlacesError::Deserialize {
                context: context.to_string(),
                source: e,
            })
        })
        .await
    }
}
