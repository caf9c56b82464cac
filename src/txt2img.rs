//! Request and response bodies for `POST /sdapi/v1/txt2img`.

use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::{
    CFG_SCALE, HEIGHT, ITERATIONS, RANDOM_SEED, SAMPLER, SCHEDULER, STEPS, WIDTH,
};

/// Request body. Everything but the prompt is pinned.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GenerationRequest<'a> {
    /// What to draw
    pub prompt: &'a str,
    /// What not to draw, always empty
    pub negative_prompt: &'a str,
    /// Sampling steps
    pub steps: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Guidance scale
    pub cfg_scale: f32,
    /// Sampler name
    #[serde(rename = "sampler_name")]
    pub sampler: &'a str,
    /// `-1` for a random seed
    pub seed: i64,
    /// Batch count
    #[serde(rename = "n_iter")]
    pub iterations: u32,
    /// Scheduler name
    pub scheduler: &'a str,
}

impl<'a> GenerationRequest<'a> {
    /// Builds the request for `prompt` with the fixed sampling parameters.
    pub fn new(prompt: &'a str) -> Self {
        Self {
            prompt,
            negative_prompt: "",
            steps: STEPS,
            width: WIDTH,
            height: HEIGHT,
            cfg_scale: CFG_SCALE,
            sampler: SAMPLER,
            seed: RANDOM_SEED,
            iterations: ITERATIONS,
            scheduler: SCHEDULER,
        }
    }
}

/// Response body. The WebUI also sends `parameters` and `info`, which we ignore.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GenerationResponse {
    /// Base64 images, possibly with a `data:` prefix
    #[serde(default, deserialize_with = "null_as_empty")]
    pub images: Vec<String>,
}

impl GenerationResponse {
    /// First image, if any. The rest are dropped.
    pub fn into_first_image(self) -> Option<String> {
        self.images.into_iter().next()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uses_webui_field_names() {
        let body = serde_json::to_value(GenerationRequest::new("a red fox")).expect("serialize");
        assert_eq!(
            body,
            serde_json::json!({
                "prompt": "a red fox",
                "negative_prompt": "",
                "steps": 4,
                "width": 1024,
                "height": 1024,
                "cfg_scale": 1.0,
                "sampler_name": "Euler",
                "seed": -1,
                "n_iter": 1,
                "scheduler": "Simple"
            })
        );
    }

    #[test]
    fn missing_or_null_images_are_empty() {
        let parsed: GenerationResponse = serde_json::from_str("{}").expect("parse");
        assert!(parsed.into_first_image().is_none());

        let parsed: GenerationResponse =
            serde_json::from_str(r#"{"images": null, "info": "{}"}"#).expect("parse");
        assert!(parsed.images.is_empty());
    }

    #[test]
    fn only_the_first_image_is_kept() {
        let parsed: GenerationResponse = serde_json::from_str(
            r#"{"images": ["first", "second"], "parameters": {"steps": 4}}"#,
        )
        .expect("parse");
        assert_eq!(parsed.into_first_image().as_deref(), Some("first"));
    }
}
