use cascade_core::ApiBase;
use cascade_transport::HttpTransportConfig;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Client configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the Cascade instance, without the `/api/v1` suffix
    pub cascade_url: String,
    /// API key sent as a bearer token
    pub api_key: Option<String>,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
    /// Limit on in-flight requests per round; unbounded when `None`
    pub max_concurrency: Option<usize>,
    /// Debug-level logging by default
    pub verbose: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            cascade_url: "http://localhost:8080".to_string(),
            api_key: None,
            timeout_ms: 30000,
            max_concurrency: None,
            verbose: false,
        }
    }
}

impl ClientConfig {
    pub fn new(cascade_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            cascade_url: cascade_url.into(),
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }

    /// Read `CASCADE_URL`, `CASCADE_API_KEY` (or `API_KEY`),
    /// `CASCADE_TIMEOUT_MS` and `CASCADE_MAX_CONCURRENCY`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let cascade_url = lookup("CASCADE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("CASCADE_URL"))?;
        let api_key = lookup("CASCADE_API_KEY")
            .or_else(|| lookup("API_KEY"))
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("CASCADE_API_KEY"))?;

        let timeout_ms = match lookup("CASCADE_TIMEOUT_MS") {
            Some(raw) => match parse_number::<u64>("CASCADE_TIMEOUT_MS", &raw)? {
                // A zero budget would time out every dispatch
                0 => {
                    return Err(ConfigError::Invalid {
                        name: "CASCADE_TIMEOUT_MS",
                        value: raw,
                    })
                }
                ms => ms,
            },
            None => defaults.timeout_ms,
        };
        let max_concurrency = match lookup("CASCADE_MAX_CONCURRENCY") {
            Some(raw) => Some(parse_number("CASCADE_MAX_CONCURRENCY", &raw)?),
            None => defaults.max_concurrency,
        };
        let verbose = lookup("CASCADE_VERBOSE")
            .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
            .unwrap_or(defaults.verbose);

        Ok(Self {
            cascade_url,
            api_key: Some(api_key),
            timeout_ms,
            max_concurrency,
            verbose,
        })
    }

    pub fn api_base(&self) -> ApiBase {
        ApiBase::new(&self.cascade_url)
    }

    pub fn transport_config(&self) -> HttpTransportConfig {
        HttpTransportConfig {
            api_key: self.api_key.clone(),
            timeout_ms: self.timeout_ms,
            ..Default::default()
        }
    }
}

fn parse_number<N: std::str::FromStr>(name: &'static str, raw: &str) -> Result<N, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: raw.to_string(),
    })
}
