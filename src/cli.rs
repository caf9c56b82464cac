//! CLI parser
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::config::{RequesterConfig, parse_timeout};
use crate::constants::{
    DEFAULT_SD_URL, ENV_AUTH_PASS, ENV_AUTH_USER, ENV_DEBUG, ENV_SD_URL, ENV_TIMEOUT_SECS,
};
use crate::error::ConfigError;

#[derive(Parser, Debug)]
#[command(name = "sdgen", about = "Generate an image with a Stable Diffusion WebUI")]
/// CLI Options
pub struct CliOptions {
    /// What the image should show
    pub prompt: String,

    #[clap(long, short)]
    /// Where to write the image; the extension picks the format (png, jpg).
    pub output: PathBuf,

    #[clap(long, help = "Enable debug logging", env = ENV_DEBUG)]
    /// Enable debug logging. Env: SD_DEBUG
    pub debug: bool,

    #[clap(long, default_value = DEFAULT_SD_URL, env = ENV_SD_URL)]
    /// WebUI base URL, defaults to `http://127.0.0.1:7860`.
    /// Env: SD_WEBUI_URL
    pub sd_url: String,

    #[clap(long, env = ENV_AUTH_USER)]
    /// Basic auth username, only used together with `--auth-pass`.
    /// Env: SD_AUTH_USER
    pub auth_user: Option<String>,

    #[clap(long, env = ENV_AUTH_PASS, hide_env_values = true)]
    /// Basic auth password, only used together with `--auth-user`.
    /// Env: SD_AUTH_PASS
    pub auth_pass: Option<String>,

    #[clap(long, default_value = "3600", env = ENV_TIMEOUT_SECS, value_parser = parse_timeout)]
    /// Request timeout in seconds, defaults to an hour.
    /// Env: SD_TIMEOUT_SECS
    pub timeout_secs: Duration,
}

impl CliOptions {
    /// Turns the options into a requester config.
    pub fn requester_config(&self) -> Result<RequesterConfig, ConfigError> {
        Ok(RequesterConfig::new(&self.sd_url)?
            .with_credentials(self.auth_user.clone(), self.auth_pass.clone())
            .with_timeout(self.timeout_secs))
    }
}
