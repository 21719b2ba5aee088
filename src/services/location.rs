// src/services/location.rs
// DOCUMENTATION: Location normalization
// PURPOSE: Turn a raw "lat,lng" string into the canonical cache key

use crate::errors::ProxyError;

/// Rounds locations to a fixed number of decimals
/// DOCUMENTATION: Two decimals is roughly 1km at the equator; nearby requests
/// collapse onto the same key, trading precision for cache hit rate
#[derive(Debug, Clone, Copy)]
pub struct LocationNormalizer {
    decimals: usize,
}

impl Default for LocationNormalizer {
    fn default() -> Self {
        Self { decimals: 2 }
    }
}

impl LocationNormalizer {
    pub fn new(decimals: usize) -> Self {
        Self { decimals }
    }

    /// Normalize a raw location string
    ///
    /// # Arguments
    /// * `raw` - Expected to hold exactly two comma-separated numbers
    ///
    /// # Returns
    /// Both values formatted with the configured decimals, joined by a comma
    pub fn normalize(&self, raw: &str) -> Result<String, ProxyError> {
        let parts: Vec<&str> = raw.split(',').collect();
        if parts.len() != 2 {
            return Err(ProxyError::InvalidLocation(format!(
                "expected \"lat,lng\", got {:?}",
                raw
            )));
        }

        let lat = parse_coordinate(parts[0])?;
        let lng = parse_coordinate(parts[1])?;

        Ok(format!("{:.*},{:.*}", self.decimals, lat, self.decimals, lng))
    }
}

/// Decimal and exponent notation only; hex floats such as "0x1p4" are rejected
fn parse_coordinate(value: &str) -> Result<f64, ProxyError> {
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ProxyError::InvalidLocation(format!(
            "{:?} is not a valid coordinate",
            value
        ))),
    }
}
