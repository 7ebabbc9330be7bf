//! Geocoding gateways backed by public web services.

pub mod nominatim;
pub mod opencage;

use addrgeo_core::gateways::geocode::GeocodingError;

fn request_error(err: &reqwest::Error) -> GeocodingError {
    if err.is_timeout() {
        GeocodingError::Timeout
    } else {
        GeocodingError::Other(err.to_string())
    }
}
