use crate::config::{Geocoding, GeocodingGateway};
use addrgeo_core::gateways::geocode::GeoCodingGateway;
use addrgeo_gateways::{nominatim::Nominatim, opencage::OpenCage};
use anyhow::Result;

pub fn geocoding_gateway(cfg: &Geocoding) -> Result<Box<dyn GeoCodingGateway>> {
    let gw: Box<dyn GeoCodingGateway> = match &cfg.gateway {
        GeocodingGateway::Nominatim {
            base_url,
            user_agent,
            timeout,
        } => Box::new(Nominatim::new(base_url, user_agent, *timeout)?),
        GeocodingGateway::OpenCage { api_key } => Box::new(OpenCage::new(api_key.clone())),
    };
    Ok(gw)
}
