use addrgeo_core::{
    entities::Coordinate,
    gateways::geocode::{GeoCodingGateway, GeocodingError},
};
use geocoding::{Forward, Opencage};

/// Forward geocoding with the OpenCage API.
pub struct OpenCage {
    client: Opencage<'static>,
}

impl OpenCage {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Opencage::new(api_key),
        }
    }
}

impl GeoCodingGateway for OpenCage {
    fn resolve_lat_lng(&self, query: &str) -> Result<Option<Coordinate>, GeocodingError> {
        let points = Forward::<f64>::forward(&self.client, query).map_err(|err| match err {
            geocoding::GeocodingError::Request(ref err) if err.is_timeout() => {
                GeocodingError::Timeout
            }
            err => GeocodingError::Other(err.to_string()),
        })?;
        // Results are ranked by confidence
        Ok(points.first().map(|point| Coordinate {
            lat: point.y(),
            lng: point.x(),
        }))
    }
}
