//! Shared constants for talking to the WebUI
//!

use std::time::Duration;

/// Where the WebUI listens unless told otherwise
pub const DEFAULT_SD_URL: &str = "http://127.0.0.1:7860";

/// Text-to-image endpoint, relative to the base URL
pub const TXT2IMG_PATH: &str = "/sdapi/v1/txt2img";

/// Env var holding the WebUI base URL
pub const ENV_SD_URL: &str = "SD_WEBUI_URL";
/// Env var holding the basic auth username
pub const ENV_AUTH_USER: &str = "SD_AUTH_USER";
/// Env var holding the basic auth password
pub const ENV_AUTH_PASS: &str = "SD_AUTH_PASS";
/// Env var holding the request timeout, in seconds
pub const ENV_TIMEOUT_SECS: &str = "SD_TIMEOUT_SECS";
/// Env var enabling debug logging
pub const ENV_DEBUG: &str = "SD_DEBUG";

/// Request timeout (in seconds). Synthesis is slow, so this is generous.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60 * 60;

/// Request timeout as a [Duration]
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(DEFAULT_TIMEOUT_SECONDS);

/// Sampling steps sent with every request
pub const STEPS: u32 = 4;
/// Output width in pixels
pub const WIDTH: u32 = 1024;
/// Output height in pixels
pub const HEIGHT: u32 = 1024;
/// Classifier-free guidance scale
pub const CFG_SCALE: f32 = 1.0;
/// Sampler name as the WebUI knows it
pub const SAMPLER: &str = "Euler";
/// Scheduler name as the WebUI knows it
pub const SCHEDULER: &str = "Simple";
/// `-1` asks the WebUI for a random seed
pub const RANDOM_SEED: i64 = -1;
/// Number of batches per request
pub const ITERATIONS: u32 = 1;
