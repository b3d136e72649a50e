use crate::config::Config;
use crate::errors::AppError;
use crate::models::{
    Lookup, PlaceDetail, PlaceDetailsResponse, PlaceStub, SearchPage, TextSearchResponse,
};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Field set requested from the details endpoint.
pub const DETAIL_FIELDS: &str = "name,formatted_phone_number,website,formatted_address,url";

/// One text-search call against the places API.
///
/// Implementations never fail: transport errors, timeouts and malformed
/// responses come back as [`Lookup::Unavailable`], which callers treat the
/// same as an empty last page. There are no retries.
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    /// Searches `query`. A `cursor` asks for the continuation page of an
    /// earlier search for the same query.
    async fn search(&self, query: &str, cursor: Option<&str>) -> Lookup<SearchPage>;
}

/// One detail lookup against the places API.
#[async_trait]
pub trait PlaceDetails: Send + Sync {
    /// Fetches the fixed field set for `place_id`. Failures come back as
    /// [`Lookup::Unavailable`] and collapse to an all-empty detail.
    async fn fetch_detail(&self, place_id: &str) -> Lookup<PlaceDetail>;
}

/// Client for the Google Places web service (text search + details).
#[derive(Clone)]
pub struct GooglePlacesService {
    client: Client,
    base_url: String,
    api_key: String,
    page_warmup: Duration,
}

impl GooglePlacesService {
    /// Creates a new `GooglePlacesService` from the application config.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.places_timeout_secs))
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create places client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.places_base_url.trim_end_matches('/').to_string(),
            api_key: config.places_api_key.clone(),
            page_warmup: Duration::from_millis(config.page_warmup_ms),
        })
    }

    /// Fetch one page of text-search results, propagating every failure.
    async fn try_search(&self, query: &str, cursor: Option<&str>) -> Result<SearchPage, AppError> {
        let mut params = vec![("query", query), ("key", self.api_key.as_str())];
        if let Some(token) = cursor {
            params.push(("pagetoken", token));
        }

        // Build URL with proper parameter encoding
        let url = reqwest::Url::parse_with_params(
            &format!("{}/textsearch/json", self.base_url),
            &params,
        )
        .map_err(|e| AppError::ExternalApiError(format!("Failed to build URL: {}", e)))?;

        // Redact key from logs
        tracing::debug!(
            "Places text search: query='{}' pagetoken={}",
            query,
            cursor.is_some()
        );

        // reqwest errors embed the request URL, key included; strip it
        let response = self.client.get(url).send().await.map_err(|e| {
            AppError::ExternalApiError(format!(
                "Places text search request failed: {}",
                e.without_url()
            ))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Places text search returned status {}: {}",
                status, error_text
            )));
        }

        let body: TextSearchResponse = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!(
                "Failed to parse text search response: {}",
                e.without_url()
            ))
        })?;

        check_api_status(body.status.as_deref(), body.error_message.as_deref())?;

        let total = body.results.len();
        let results: Vec<PlaceStub> = body
            .results
            .into_iter()
            .filter_map(|raw| serde_json::from_value::<PlaceStub>(raw).ok())
            .collect();
        if results.len() < total {
            tracing::debug!(
                "Skipped {} text search result(s) without a place_id",
                total - results.len()
            );
        }

        Ok(SearchPage {
            results,
            next_page_token: body.next_page_token.filter(|t| !t.is_empty()),
        })
    }

    /// Fetch the detail field set for one place, propagating every failure.
    async fn try_fetch_detail(&self, place_id: &str) -> Result<PlaceDetail, AppError> {
        let url = reqwest::Url::parse_with_params(
            &format!("{}/details/json", self.base_url),
            &[
                ("place_id", place_id),
                ("fields", DETAIL_FIELDS),
                ("key", self.api_key.as_str()),
            ],
        )
        .map_err(|e| AppError::ExternalApiError(format!("Failed to build URL: {}", e)))?;

        tracing::debug!("Places details: place_id={}", place_id);

        let response = self.client.get(url).send().await.map_err(|e| {
            AppError::ExternalApiError(format!(
                "Places details request failed: {}",
                e.without_url()
            ))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Places details returned status {}: {}",
                status, error_text
            )));
        }

        let body: PlaceDetailsResponse = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!(
                "Failed to parse details response: {}",
                e.without_url()
            ))
        })?;

        check_api_status(body.status.as_deref(), body.error_message.as_deref())?;

        Ok(body.result.unwrap_or_default())
    }
}

#[async_trait]
impl PlaceSearch for GooglePlacesService {
    async fn search(&self, query: &str, cursor: Option<&str>) -> Lookup<SearchPage> {
        // A fresh cursor is rejected upstream until it has warmed up
        if cursor.is_some() && !self.page_warmup.is_zero() {
            tokio::time::sleep(self.page_warmup).await;
        }

        match self.try_search(query, cursor).await {
            Ok(page) => Lookup::Found(page),
            Err(e) => {
                tracing::warn!("Text search for '{}' degraded to empty: {}", query, e);
                Lookup::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }
}

#[async_trait]
impl PlaceDetails for GooglePlacesService {
    async fn fetch_detail(&self, place_id: &str) -> Lookup<PlaceDetail> {
        match self.try_fetch_detail(place_id).await {
            Ok(detail) => Lookup::Found(detail),
            Err(e) => {
                tracing::warn!("Details for {} degraded to empty: {}", place_id, e);
                Lookup::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// The places API reports most failures with HTTP 200 and a `status` field.
fn check_api_status(status: Option<&str>, error_message: Option<&str>) -> Result<(), AppError> {
    match status {
        None | Some("OK") | Some("ZERO_RESULTS") => Ok(()),
        Some(other) => Err(AppError::ExternalApiError(format!(
            "Places API status {}: {}",
            other,
            error_message.unwrap_or("no error message")
        ))),
    }
}
