// src/services/places_client.rs
// DOCUMENTATION: Google Places API client
// PURPOSE: Fetch nearby search results and reduce them to the proxy's output format

use crate::errors::ProxyError;
use crate::models::{NearbySearchResponse, PlacesResponse};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;

/// Source of transformed nearby search results
/// DOCUMENTATION: Cache-agnostic; implementors never touch the cache
#[async_trait]
pub trait PlacesFetcher: Send + Sync {
    /// Fetch places around a canonical location and return the serialized
    /// reduced response
    async fn fetch_places(&self, location: &str, radius: &str) -> Result<Bytes, ProxyError>;
}

/// Google Places API client
/// DOCUMENTATION: Handles authentication and nearby search calls
pub struct PlacesClient {
    /// HTTP client for making requests
    client: Client,
    /// Google Places API key
    api_key: String,
    /// Nearby search endpoint
    base_url: String,
}

impl PlacesClient {
    /// Create new Google Places API client
    /// DOCUMENTATION: Initializes client with API key and endpoint
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url,
        }
    }
}

#[async_trait]
impl PlacesFetcher for PlacesClient {
    async fn fetch_places(&self, location: &str, radius: &str) -> Result<Bytes, ProxyError> {
        let params = [
            ("key", self.api_key.as_str()),
            ("location", location),
            ("radius", radius),
        ];

        log::debug!(
            "Google Places nearby search: location={}, radius={}",
            location,
            radius
        );

        let response = self
            .client
            .get(&self.base_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| ProxyError::FetchFailed(format!("Request failed: {}", e.without_url())))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProxyError::FetchFailed(format!(
                "API error {}: {}",
                status, body
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ProxyError::FetchFailed(format!("Failed to read body: {}", e.without_url())))?;

        format_places(&body)
    }
}

/// Decode an upstream nearby search body and re-serialize the reduced form
/// DOCUMENTATION: Keeps only results[].geometry.location. A non-OK upstream
/// status is logged but still served as whatever results the body carries.
pub fn format_places(body: &[u8]) -> Result<Bytes, ProxyError> {
    let api_response: NearbySearchResponse =
        serde_json::from_slice(body).map_err(|e| ProxyError::DecodeError(e.to_string()))?;

    match api_response.status.as_deref() {
        None | Some("OK") | Some("ZERO_RESULTS") => {}
        Some(other) => {
            log::warn!(
                "Google Places API returned status {}: {}",
                other,
                api_response.error_message.as_deref().unwrap_or("no error message")
            );
        }
    }

    let places = PlacesResponse::from(api_response);
    log::debug!("Google Places search returned {} results", places.results.len());

    let encoded = serde_json::to_vec(&places).map_err(|e| ProxyError::DecodeError(e.to_string()))?;
    Ok(Bytes::from(encoded))
}
