use crate::{
    entities::Coordinate,
    gateways::geocode::{GeoCodingGateway, GeocodingError},
    resolve::Pause,
};
use std::{cell::RefCell, collections::VecDeque, time::Duration};

/// Replays canned responses and answers `Ok(None)` once they are used up.
#[derive(Default)]
pub struct MockGeoGW {
    pub responses: RefCell<VecDeque<Result<Option<Coordinate>, GeocodingError>>>,
    pub queries: RefCell<Vec<String>>,
}

impl MockGeoGW {
    pub fn with_responses(responses: Vec<Result<Option<Coordinate>, GeocodingError>>) -> Self {
        Self {
            responses: RefCell::new(responses.into()),
            ..Default::default()
        }
    }
}

impl GeoCodingGateway for MockGeoGW {
    fn resolve_lat_lng(&self, query: &str) -> Result<Option<Coordinate>, GeocodingError> {
        self.queries.borrow_mut().push(query.to_string());
        self.responses.borrow_mut().pop_front().unwrap_or(Ok(None))
    }
}

#[derive(Debug, Default)]
pub struct RecordingPause {
    pub pauses: RefCell<Vec<Duration>>,
}

impl Pause for RecordingPause {
    fn pause(&self, duration: Duration) {
        self.pauses.borrow_mut().push(duration);
    }
}
