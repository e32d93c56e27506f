mod ipinfo;
mod nominatim;

use async_trait::async_trait;
use std::net::Ipv4Addr;
use std::time::Duration;

pub use ipinfo::IpinfoClient;
pub use nominatim::NominatimClient;

use crate::types::{Coordinate, Place};

/// Result type for geo client operations
pub type GeoResult<T> = Result<T, GeoError>;

/// Errors that can occur while talking to the geo collaborators
#[derive(Debug, thiserror::Error)]
pub enum GeoError {
    #[error("API request failed: {0}")]
    Api(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Response parsing failed: {0}")]
    Parse(String),
}

/// Raw geolocation lookup response, before validation.
///
/// `loc` and `org` stay optional here; the validator decides whether the
/// record is playable.
#[derive(Debug, Clone)]
pub struct LookupResponse {
    pub ip: String,
    pub bogon: bool,
    pub coordinate: Option<Coordinate>,
    pub organization: Option<String>,
    pub hostname: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
}

/// One geolocation lookup per candidate IP. No retry at this layer.
#[async_trait]
pub trait GeoLookup: Send + Sync {
    async fn lookup(&self, ip: Ipv4Addr) -> GeoResult<LookupResponse>;
}

/// Resolves a clicked coordinate to a place name.
#[async_trait]
pub trait ReverseGeocode: Send + Sync {
    async fn resolve(&self, coordinate: Coordinate) -> GeoResult<Place>;
}
