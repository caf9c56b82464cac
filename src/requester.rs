//! The client that asks the WebUI for an image and writes it to disk.

use std::path::{Path, PathBuf};

use reqwest::Client;
use tracing::{debug, info};
use url::Url;

use crate::config::{Credentials, RequesterConfig};
use crate::error::GenerationError;
use crate::image_data::{decode_image, encode_for_path, write_image_file};
use crate::txt2img::{GenerationRequest, GenerationResponse};

/// Talks to one WebUI instance. Cheap to share; calls are independent.
#[derive(Clone, Debug)]
pub struct ImageRequester {
    client: Client,
    endpoint: Url,
    credentials: Option<Credentials>,
}

impl ImageRequester {
    /// Builds the HTTP client from `config`.
    pub fn new(config: RequesterConfig) -> Result<Self, GenerationError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        let endpoint = config.txt2img_url();
        Ok(Self {
            client,
            endpoint,
            credentials: config.into_credentials(),
        })
    }

    /// Shortcut for [RequesterConfig::from_env] followed by [Self::new].
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let config = RequesterConfig::from_env()?;
        Ok(Self::new(config)?)
    }

    /// The URL requests are sent to
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Generates one image for `prompt` and saves it at `output_path`.
    ///
    /// The format is picked from the extension of `output_path`, and missing parent
    /// directories are created. On success the path is handed back; on failure nothing
    /// is written.
    pub async fn generate_and_save(
        &self,
        prompt: &str,
        output_path: impl AsRef<Path>,
    ) -> Result<PathBuf, GenerationError> {
        let output_path = output_path.as_ref().to_path_buf();

        let payload = self.request_image(prompt).await?;

        let encode_path = output_path.clone();
        let bytes = tokio::task::spawn_blocking(move || {
            let image = decode_image(&payload, &encode_path)?;
            encode_for_path(&image, &encode_path)
        })
        .await
        .map_err(|err| GenerationError::persistence(&output_path, err))??;

        write_image_file(&bytes, &output_path).await?;
        info!("Saved image to {}", output_path.display());
        Ok(output_path)
    }

    /// Sends the txt2img request and returns the first image payload.
    async fn request_image(&self, prompt: &str) -> Result<String, GenerationError> {
        let body = GenerationRequest::new(prompt);

        let mut request = self.client.post(self.endpoint.clone()).json(&body);
        if let Some(creds) = &self.credentials {
            request = request.basic_auth(&creds.username, Some(&creds.password));
        }

        debug!("POST {} ({} char prompt)", self.endpoint, prompt.len());
        let resp = request.send().await.map_err(|err| {
            GenerationError::Transport(format!("request to {} failed: {err}", self.endpoint))
        })?;

        let status = resp.status();
        let bytes = resp.bytes().await.map_err(|err| {
            GenerationError::Transport(format!("failed reading response body: {err}"))
        })?;
        debug!("Got {} with {} byte body", status, bytes.len());

        if !status.is_success() {
            return Err(GenerationError::Transport(format!(
                "WebUI returned {status}: {}",
                String::from_utf8_lossy(&bytes)
            )));
        }

        let parsed: GenerationResponse = serde_json::from_slice(&bytes).map_err(|err| {
            GenerationError::Transport(format!("failed to parse txt2img response: {err}"))
        })?;

        parsed.into_first_image().ok_or(GenerationError::NoImages)
    }
}
