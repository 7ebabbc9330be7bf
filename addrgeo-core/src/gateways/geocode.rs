use crate::entities::Coordinate;
use thiserror::Error;

/// A transient failure of a single geocoding request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodingError {
    #[error("Request timed out")]
    Timeout,
    #[error("{0}")]
    Other(String),
}

/// An external forward geocoding service.
///
/// Implementations must ask the service for exactly one result and
/// return `Ok(None)` if nothing matched.
pub trait GeoCodingGateway {
    fn resolve_lat_lng(&self, query: &str) -> Result<Option<Coordinate>, GeocodingError>;
}

impl<G> GeoCodingGateway for &G
where
    G: GeoCodingGateway + ?Sized,
{
    fn resolve_lat_lng(&self, query: &str) -> Result<Option<Coordinate>, GeocodingError> {
        (**self).resolve_lat_lng(query)
    }
}

impl<G> GeoCodingGateway for Box<G>
where
    G: GeoCodingGateway + ?Sized,
{
    fn resolve_lat_lng(&self, query: &str) -> Result<Option<Coordinate>, GeocodingError> {
        (**self).resolve_lat_lng(query)
    }
}
