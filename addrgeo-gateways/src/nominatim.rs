use std::time::Duration;

use addrgeo_core::{
    entities::Coordinate,
    gateways::geocode::{GeoCodingGateway, GeocodingError},
};
use reqwest::blocking::Client;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Forward geocoding with the Nominatim search API.
///
/// The public instance allows at most one request per second and
/// requires an identifying user agent.
#[derive(Debug, Clone)]
pub struct Nominatim {
    client: Client,
    search_url: String,
}

impl Nominatim {
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        let search_url = format!("{}/search", base_url.trim_end_matches('/'));
        Ok(Self { client, search_url })
    }
}

impl GeoCodingGateway for Nominatim {
    fn resolve_lat_lng(&self, query: &str) -> Result<Option<Coordinate>, GeocodingError> {
        log::debug!("Querying {} for '{query}'", self.search_url);
        let places: Vec<Place> = self
            .client
            .get(&self.search_url)
            .query(&[("q", query), ("format", "jsonv2"), ("limit", "1")])
            .send()
            .and_then(|res| res.error_for_status())
            .and_then(|res| res.json())
            .map_err(|err| super::request_error(&err))?;
        first_location(places).map_err(|err| GeocodingError::Other(err.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

#[derive(Debug, Error)]
enum ResponseError {
    #[error("Invalid latitude '{0}' in response")]
    Latitude(String),
    #[error("Invalid longitude '{0}' in response")]
    Longitude(String),
}

fn first_location(places: Vec<Place>) -> Result<Option<Coordinate>, ResponseError> {
    let Some(Place { lat, lon }) = places.into_iter().next() else {
        return Ok(None);
    };
    let lat = lat.parse().map_err(|_| ResponseError::Latitude(lat))?;
    let lng = lon.parse().map_err(|_| ResponseError::Longitude(lon))?;
    Ok(Some(Coordinate { lat, lng }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_search_response() {
        let body = r#"[{
            "place_id": 123,
            "licence": "Data © OpenStreetMap contributors, ODbL 1.0.",
            "osm_type": "way",
            "osm_id": 4567,
            "lat": "52.5294",
            "lon": "13.4015",
            "display_name": "Torstraße, Mitte, Berlin, 10119, Deutschland"
        }]"#;
        let places: Vec<Place> = serde_json::from_str(body).unwrap();
        let pos = first_location(places).unwrap().unwrap();
        assert_eq!(52.5294, pos.lat);
        assert_eq!(13.4015, pos.lng);
    }

    #[test]
    fn empty_response_is_no_match() {
        let places: Vec<Place> = serde_json::from_str("[]").unwrap();
        assert!(first_location(places).unwrap().is_none());
    }

    #[test]
    fn reject_garbage_coordinates() {
        let places = vec![Place {
            lat: "north".into(),
            lon: "13.4".into(),
        }];
        assert!(matches!(
            first_location(places),
            Err(ResponseError::Latitude(_))
        ));
    }

    #[test]
    fn build_search_url() {
        let gw = Nominatim::new("http://localhost:8080/", "addrgeo-test", Duration::from_secs(1))
            .unwrap();
        assert_eq!("http://localhost:8080/search", gw.search_url);
    }
}
