use addrgeo_core::resolve::{ResolvePolicy, MAX_ATTEMPTS};
use addrgeo_gateways::nominatim;
use anyhow::{anyhow, bail, Context as _, Result};
use std::{env, fs, io::ErrorKind, path::Path, time::Duration};

mod raw;

pub use raw::OnFormatError;

const DEFAULT_CONFIG_FILE_NAME: &str = "addrgeo.toml";

const ENV_NAME_OPENCAGE_API_KEY: &str = "OPENCAGE_API_KEY";
const ENV_NAME_NOMINATIM_USER_AGENT: &str = "NOMINATIM_USER_AGENT";

const DEFAULT_NOMINATIM_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_DELIMITER: u8 = b';';

#[derive(Debug)]
pub struct Config {
    pub geocoding: Geocoding,
    pub resolver: ResolvePolicy,
    pub input: Input,
}

impl Config {
    /// Loads the given file or, if none is given, `addrgeo.toml` from the
    /// working directory if it exists.
    pub fn try_load_from_file_or_default<P: AsRef<Path>>(file_path: Option<P>) -> Result<Self> {
        let mut raw_config = match file_path {
            Some(file_path) => {
                let file_path = file_path.as_ref();
                log::info!("Load configuration from {}", file_path.display());
                let cfg_string = fs::read_to_string(file_path)
                    .with_context(|| format!("Unable to read {}", file_path.display()))?;
                toml::from_str(&cfg_string)?
            }
            None => match fs::read_to_string(DEFAULT_CONFIG_FILE_NAME) {
                Ok(cfg_string) => {
                    log::info!("Load configuration from {DEFAULT_CONFIG_FILE_NAME}");
                    toml::from_str(&cfg_string)?
                }
                Err(err) => match err.kind() {
                    ErrorKind::NotFound => {
                        log::info!(
                            "{DEFAULT_CONFIG_FILE_NAME} not found => load default configuration."
                        );
                        Ok(raw::Config::default())
                    }
                    _ => Err(err),
                }?,
            },
        };
        apply_env(&mut raw_config);
        Self::try_from(raw_config)
    }
}

fn apply_env(cfg: &mut raw::Config) {
    if let Ok(api_key) = env::var(ENV_NAME_OPENCAGE_API_KEY) {
        let gateway = cfg.gateway.get_or_insert_with(Default::default);
        gateway
            .opencage
            .get_or_insert_with(Default::default)
            .api_key = Some(api_key);
    }
    if let Ok(user_agent) = env::var(ENV_NAME_NOMINATIM_USER_AGENT) {
        let gateway = cfg.gateway.get_or_insert_with(Default::default);
        gateway
            .nominatim
            .get_or_insert_with(Default::default)
            .user_agent = Some(user_agent);
    }
}

#[derive(Debug)]
pub struct Geocoding {
    pub gateway: GeocodingGateway,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeocodingGateway {
    Nominatim {
        base_url: String,
        user_agent: String,
        timeout: Duration,
    },
    OpenCage {
        api_key: String,
    },
}

#[derive(Debug)]
pub struct Input {
    pub delimiter: u8,
    pub on_format_error: OnFormatError,
}

impl TryFrom<raw::Config> for Config {
    type Error = anyhow::Error;
    fn try_from(from: raw::Config) -> Result<Self> {
        let raw::Config {
            geocoding,
            gateway,
            resolver,
            input,
        } = from;

        let gw_name = geocoding
            .unwrap_or_default()
            .gateway
            .unwrap_or(raw::GeocodingGateway::Nominatim);
        let toml_name = gw_name.name();
        let gateway = gateway.unwrap_or_default();
        let gateway = match gw_name {
            raw::GeocodingGateway::Nominatim => {
                let defaults = raw::Nominatim::default();
                let raw::Nominatim {
                    base_url,
                    user_agent,
                    timeout,
                } = gateway.nominatim.unwrap_or_else(|| defaults.clone());
                let user_agent = user_agent
                    .or(defaults.user_agent)
                    .filter(|ua| !ua.trim().is_empty())
                    .ok_or_else(|| {
                        anyhow!("Missing 'user-agent' in '{toml_name}' gateway configuration")
                    })?;
                let base_url = base_url
                    .or(defaults.base_url)
                    .unwrap_or_else(|| nominatim::DEFAULT_BASE_URL.to_string());
                let timeout = timeout
                    .or(defaults.timeout)
                    .unwrap_or(DEFAULT_NOMINATIM_TIMEOUT);
                log::info!("Use Nominatim gateway ({base_url})");
                GeocodingGateway::Nominatim {
                    base_url,
                    user_agent,
                    timeout,
                }
            }
            raw::GeocodingGateway::Opencage => {
                let raw::OpenCage { api_key } = gateway.opencage.unwrap_or_default();
                let api_key = api_key
                    .ok_or_else(|| anyhow!("Missing '{toml_name}' gateway configuration"))?;
                log::info!("Use OpenCage gateway");
                GeocodingGateway::OpenCage { api_key }
            }
        };
        let geocoding = Geocoding { gateway };

        let raw::Resolver {
            min_request_interval,
            failure_cooldown,
            max_attempts,
        } = resolver.unwrap_or_default();
        let defaults = ResolvePolicy::default();
        let max_attempts = match max_attempts {
            Some(0) => bail!("At least one resolver attempt is required"),
            Some(n) if n > MAX_ATTEMPTS => {
                log::warn!("Limiting resolver attempts to {MAX_ATTEMPTS} (configured: {n})");
                MAX_ATTEMPTS
            }
            Some(n) => n,
            None => defaults.max_attempts,
        };
        let resolver = ResolvePolicy {
            min_request_interval: min_request_interval.unwrap_or(defaults.min_request_interval),
            failure_cooldown: failure_cooldown.unwrap_or(defaults.failure_cooldown),
            max_attempts,
        };

        let raw::Input {
            delimiter,
            on_format_error,
        } = input.unwrap_or_default();
        let delimiter = match delimiter {
            Some(c) if c.is_ascii() => c as u8,
            Some(c) => bail!("Invalid delimiter '{c}': only ASCII characters are supported"),
            None => DEFAULT_DELIMITER,
        };
        let input = Input {
            delimiter,
            on_format_error: on_format_error.unwrap_or_default(),
        };

        Ok(Self {
            geocoding,
            resolver,
            input,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(cfg: &str) -> Result<Config> {
        let raw: raw::Config = toml::from_str(cfg)?;
        Config::try_from(raw)
    }

    #[test]
    fn load_default_config() {
        let cfg = Config::try_from(raw::Config::default()).unwrap();
        assert_eq!(ResolvePolicy::default(), cfg.resolver);
        assert_eq!(b';', cfg.input.delimiter);
        assert_eq!(OnFormatError::Skip, cfg.input.on_format_error);
        assert!(matches!(
            cfg.geocoding.gateway,
            GeocodingGateway::Nominatim { .. }
        ));
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let cfg = parse("[input]\ndelimiter = \",\"\n").unwrap();
        assert_eq!(b',', cfg.input.delimiter);
        assert_eq!(ResolvePolicy::default(), cfg.resolver);
        assert_eq!(
            GeocodingGateway::Nominatim {
                base_url: "https://nominatim.openstreetmap.org".into(),
                user_agent: "addrgeo".into(),
                timeout: Duration::from_secs(10),
            },
            cfg.geocoding.gateway
        );
    }

    #[test]
    fn opencage_requires_an_api_key() {
        assert!(parse("[geocoding]\ngateway = \"opencage\"\n").is_err());
        let cfg = parse(
            "[geocoding]\ngateway = \"opencage\"\n[gateway.opencage]\napi-key = \"secret\"\n",
        )
        .unwrap();
        assert_eq!(
            GeocodingGateway::OpenCage {
                api_key: "secret".into()
            },
            cfg.geocoding.gateway
        );
    }

    #[test]
    fn nominatim_requires_a_user_agent() {
        assert!(parse("[gateway.nominatim]\nuser-agent = \" \"\n").is_err());
    }

    #[test]
    fn resolver_attempts() {
        assert!(parse("[resolver]\nmax-attempts = 0\n").is_err());
        let cfg = parse("[resolver]\nmax-attempts = 7\nfailure-cooldown = \"5s\"\n").unwrap();
        assert_eq!(MAX_ATTEMPTS, cfg.resolver.max_attempts);
        assert_eq!(Duration::from_secs(5), cfg.resolver.failure_cooldown);
        assert_eq!(Duration::from_secs(1), cfg.resolver.min_request_interval);
    }

    #[test]
    fn reject_non_ascii_delimiter() {
        assert!(parse("[input]\ndelimiter = \"§\"\n").is_err());
    }
}
