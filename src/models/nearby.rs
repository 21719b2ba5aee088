// src/models/nearby.rs
// DOCUMENTATION: Nearby search data structures
// PURPOSE: Request parameters, upstream response schema, and reduced output schema

use serde::{Deserialize, Serialize};

/// Form parameters accepted by the proxy route
/// DOCUMENTATION: Both fields are optional at the wire level; a missing value
/// behaves like an empty string
#[derive(Debug, Clone, Default)]
pub struct NearbyParams {
    /// Raw "lat,lng" string
    pub location: Option<String>,
    /// Search radius, forwarded verbatim
    pub radius: Option<String>,
}

impl NearbyParams {
    /// Build from decoded form pairs; the first value of a repeated key wins
    pub fn from_pairs(pairs: Vec<(String, String)>) -> NearbyParams {
        let mut params = NearbyParams::default();
        for (name, value) in pairs {
            let slot = match name.as_str() {
                "location" => &mut params.location,
                "radius" => &mut params.radius,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        params
    }

    /// Overlay `other` on top of `self`, field by field
    pub fn overridden_by(self, other: NearbyParams) -> NearbyParams {
        NearbyParams {
            location: other.location.or(self.location),
            radius: other.radius.or(self.radius),
        }
    }

    pub fn location(&self) -> &str {
        self.location.as_deref().unwrap_or_default()
    }

    pub fn radius(&self) -> &str {
        self.radius.as_deref().unwrap_or_default()
    }
}

/// Response from the upstream nearby search
/// DOCUMENTATION: Only the fields the proxy inspects are decoded; everything
/// else in the upstream payload is ignored. Missing or null pieces decode as
/// empty/zero values rather than failing.
#[derive(Debug, Deserialize)]
pub struct NearbySearchResponse {
    /// Results array from API
    #[serde(default)]
    pub results: Option<Vec<PlaceResult>>,
    /// Status of the API call (absent on some mirrors of the API)
    #[serde(default)]
    pub status: Option<String>,
    /// Error message (if status is not OK)
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Reduced response served to clients and stored in the cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacesResponse {
    pub results: Vec<PlaceResult>,
}

/// Individual place, reduced to its geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceResult {
    #[serde(default)]
    pub geometry: Geometry,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(default)]
    pub location: LatLng,
}

/// Coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lng: f64,
}

impl From<NearbySearchResponse> for PlacesResponse {
    fn from(response: NearbySearchResponse) -> Self {
        PlacesResponse {
            results: response.results.unwrap_or_default(),
        }
    }
}
