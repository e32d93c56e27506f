use super::*;
use serde::Deserialize;
use std::time::Duration;

use crate::types::Place;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Nominatim reverse geocoding client
pub struct NominatimClient {
    base_url: String,
    client: reqwest::Client,
}

impl NominatimClient {
    pub fn new(base_url: String) -> Self {
        // Nominatim's usage policy requires an identifying User-Agent
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("ipguessr/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap();

        Self { base_url, client }
    }
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    address: Option<NominatimAddress>,
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    state: Option<String>,
    country_code: Option<String>,
}

impl NominatimAddress {
    fn into_place(self) -> Place {
        Place {
            city: self
                .city
                .or(self.town)
                .or(self.village)
                .unwrap_or_else(|| "Unknown".to_string()),
            region: self.state.unwrap_or_else(|| "Unknown".to_string()),
            country: self
                .country_code
                .map(|c| c.to_uppercase())
                .unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}

#[async_trait]
impl ReverseGeocode for NominatimClient {
    async fn resolve(&self, coordinate: Coordinate) -> GeoResult<Place> {
        let url = format!(
            "{}/reverse?lat={}&lon={}&format=json&addressdetails=1&accept-language=en",
            self.base_url, coordinate.lat, coordinate.lon
        );

        let response = tokio::time::timeout(REQUEST_TIMEOUT, self.client.get(&url).send())
            .await
            .map_err(|_| GeoError::Timeout(REQUEST_TIMEOUT))?
            .map_err(|e| GeoError::Api(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GeoError::Api(format!(
                "nominatim returned status: {}",
                response.status()
            )));
        }

        let body: NominatimResponse = response
            .json()
            .await
            .map_err(|e| GeoError::Parse(e.to_string()))?;

        // Mid-ocean clicks come back without an address block
        Ok(body
            .address
            .map(NominatimAddress::into_place)
            .unwrap_or_else(Place::unknown))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_fallback_chain() {
        let address = NominatimAddress {
            city: None,
            town: Some("Smalltown".to_string()),
            village: Some("Tinyville".to_string()),
            state: Some("Bavaria".to_string()),
            country_code: Some("de".to_string()),
        };

        let place = address.into_place();
        assert_eq!(place.city, "Smalltown");
        assert_eq!(place.region, "Bavaria");
        assert_eq!(place.country, "DE");
    }

    #[test]
    fn test_address_all_missing() {
        let address = NominatimAddress {
            city: None,
            town: None,
            village: None,
            state: None,
            country_code: None,
        };

        assert_eq!(address.into_place(), Place::unknown());
    }

    #[tokio::test]
    #[ignore] // Hits the live Nominatim API
    async fn test_resolve_berlin() {
        let client = NominatimClient::new("https://nominatim.openstreetmap.org".to_string());
        let place = client
            .resolve(Coordinate::new(52.52, 13.405))
            .await
            .unwrap();

        assert_eq!(place.country, "DE");
    }
}
