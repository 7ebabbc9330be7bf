use duration_str::deserialize_option_duration;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_CONFIG_FILE: &str = include_str!("addrgeo.default.toml");

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub geocoding: Option<Geocoding>,
    pub gateway: Option<Gateway>,
    pub resolver: Option<Resolver>,
    pub input: Option<Input>,
}

impl Default for Config {
    fn default() -> Self {
        let cfg: Self = toml::from_str(DEFAULT_CONFIG_FILE).expect("Default configuration");
        cfg
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Geocoding {
    pub gateway: Option<GeocodingGateway>,
}

impl Default for Geocoding {
    fn default() -> Self {
        Config::default()
            .geocoding
            .expect("Geocoding configuration")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GeocodingGateway {
    Nominatim,
    Opencage,
}

impl GeocodingGateway {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Nominatim => "nominatim",
            Self::Opencage => "opencage",
        }
    }
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Gateway {
    pub nominatim: Option<Nominatim>,
    pub opencage: Option<OpenCage>,
}

impl Default for Gateway {
    fn default() -> Self {
        Config::default().gateway.expect("Gateway configuration")
    }
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Nominatim {
    pub base_url: Option<String>,
    pub user_agent: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_duration")]
    pub timeout: Option<Duration>,
}

impl Default for Nominatim {
    fn default() -> Self {
        Gateway::default()
            .nominatim
            .expect("Nominatim gateway configuration")
    }
}

#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OpenCage {
    pub api_key: Option<String>,
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Resolver {
    #[serde(default, deserialize_with = "deserialize_option_duration")]
    pub min_request_interval: Option<Duration>,
    #[serde(default, deserialize_with = "deserialize_option_duration")]
    pub failure_cooldown: Option<Duration>,
    pub max_attempts: Option<usize>,
}

impl Default for Resolver {
    fn default() -> Self {
        Config::default().resolver.expect("Resolver configuration")
    }
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Input {
    pub delimiter: Option<char>,
    pub on_format_error: Option<OnFormatError>,
}

impl Default for Input {
    fn default() -> Self {
        Config::default().input.expect("Input configuration")
    }
}

/// What to do with a record whose fields cannot be normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OnFormatError {
    #[default]
    Skip,
    Abort,
}
