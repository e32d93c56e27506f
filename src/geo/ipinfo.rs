use super::*;
use serde::Deserialize;
use std::time::Duration;

use crate::types::Coordinate;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// ipinfo.io geolocation lookup client
pub struct IpinfoClient {
    base_url: String,
    client: reqwest::Client,
}

impl IpinfoClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap();

        Self { base_url, client }
    }
}

#[derive(Debug, Deserialize)]
struct IpinfoResponse {
    #[serde(default)]
    ip: Option<String>,
    #[serde(default)]
    bogon: bool,
    /// "lat,lon"
    #[serde(default)]
    loc: Option<String>,
    #[serde(default)]
    org: Option<String>,
    #[serde(default)]
    hostname: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

/// Parse the "lat,lon" pair ipinfo returns.
fn parse_loc(loc: &str) -> Option<Coordinate> {
    let (lat, lon) = loc.split_once(',')?;
    Some(Coordinate::new(
        lat.trim().parse().ok()?,
        lon.trim().parse().ok()?,
    ))
}

#[async_trait]
impl GeoLookup for IpinfoClient {
    async fn lookup(&self, ip: Ipv4Addr) -> GeoResult<LookupResponse> {
        let url = format!("{}/{}/json", self.base_url, ip);

        let response = tokio::time::timeout(REQUEST_TIMEOUT, self.client.get(&url).send())
            .await
            .map_err(|_| GeoError::Timeout(REQUEST_TIMEOUT))?
            .map_err(|e| GeoError::Api(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GeoError::Api(format!(
                "ipinfo returned status: {}",
                response.status()
            )));
        }

        let body: IpinfoResponse = response
            .json()
            .await
            .map_err(|e| GeoError::Parse(e.to_string()))?;

        Ok(LookupResponse {
            ip: body.ip.unwrap_or_else(|| ip.to_string()),
            bogon: body.bogon,
            coordinate: body.loc.as_deref().and_then(parse_loc),
            organization: body.org,
            hostname: body.hostname,
            city: body.city,
            region: body.region,
            country: body.country,
        })
    }
}
