//! Config handling

use std::time::Duration;

use tracing::log::LevelFilter;
use url::Url;

use crate::constants::{
    DEFAULT_SD_URL, DEFAULT_TIMEOUT, ENV_AUTH_PASS, ENV_AUTH_USER, ENV_SD_URL, ENV_TIMEOUT_SECS,
    TXT2IMG_PATH,
};
use crate::error::ConfigError;

/// Sets up logging based on the debug flag
pub fn setup_logging(debug: bool) -> Result<(), Box<std::io::Error>> {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut logger = simple_logger::SimpleLogger::new().with_level(level);
    if !debug {
        logger = logger
            .with_module_level("tracing", LevelFilter::Warn)
            .with_module_level("reqwest", LevelFilter::Warn)
            .with_module_level("rustls", LevelFilter::Info)
            .with_module_level("hyper_util", LevelFilter::Info)
            .with_module_level("h2", LevelFilter::Info);
    }
    logger.init().map_err(|err| {
        eprintln!("Failed to initialize logger: {}", err);
        Box::new(std::io::Error::other(err))
    })
}

/// HTTP basic auth pair sent with every request.
#[derive(Clone, Eq, PartialEq)]
pub struct Credentials {
    /// Username
    pub username: String,
    /// Password
    pub password: String,
}

impl Credentials {
    /// Only yields credentials when both halves are set and non-empty.
    pub fn from_parts(username: Option<String>, password: Option<String>) -> Option<Self> {
        match (username, password) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Some(Self { username, password })
            }
            _ => None,
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Everything an [crate::requester::ImageRequester] needs, captured once at construction.
#[derive(Clone, Debug)]
pub struct RequesterConfig {
    base_url: Url,
    credentials: Option<Credentials>,
    timeout: Duration,
}

impl RequesterConfig {
    /// Config pointing at `base_url`, no auth, default timeout.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let parsed = Url::parse(base_url.trim())
            .map_err(|err| ConfigError::InvalidUrl(base_url.to_string(), err))?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.cannot_be_a_base() {
            return Err(ConfigError::UnsupportedUrl(base_url.to_string()));
        }
        Ok(Self {
            base_url: parsed,
            credentials: None,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Sets basic auth, if and only if both parts are present.
    pub fn with_credentials(mut self, username: Option<String>, password: Option<String>) -> Self {
        self.credentials = Credentials::from_parts(username, password);
        self
    }

    /// Overrides the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reads `SD_WEBUI_URL`, `SD_AUTH_USER`, `SD_AUTH_PASS` and `SD_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [Self::from_env] but with a caller supplied variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(ENV_SD_URL).unwrap_or_else(|| DEFAULT_SD_URL.to_string());
        let mut config = Self::new(&base_url)?
            .with_credentials(lookup(ENV_AUTH_USER), lookup(ENV_AUTH_PASS));

        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            config = config.with_timeout(parse_timeout(&raw)?);
        }
        Ok(config)
    }

    /// The configured base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Basic auth credentials, if any
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub(crate) fn into_credentials(self) -> Option<Credentials> {
        self.credentials
    }

    /// Whole-request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `<base_url>/sdapi/v1/txt2img`, tolerating a trailing slash on the base.
    pub fn txt2img_url(&self) -> Url {
        let mut url = self.base_url.clone();
        let path = format!("{}{}", url.path().trim_end_matches('/'), TXT2IMG_PATH);
        url.set_path(&path);
        url.set_query(None);
        url.set_fragment(None);
        url
    }
}

/// Parses a timeout given in whole seconds, refusing zero.
pub fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(0) | Err(_) => Err(ConfigError::InvalidTimeout(raw.to_string())),
        Ok(secs) => Ok(Duration::from_secs(secs)),
    }
}
