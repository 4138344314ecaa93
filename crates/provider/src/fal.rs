//! fal.ai client for the hosted FIBO model (synchronous `fal.run` endpoint).

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::ProviderError;
use crate::http;
use crate::provider::GenerationProvider;
use crate::request::{GenerationRequest, GenerationResult};

/// Synchronous run endpoint for the FIBO model.
pub const FAL_FIBO_URL: &str = "https://fal.run/fal-ai/bria/fibo";

/// Classifier-free guidance scale sent with every request.
pub const FAL_GUIDANCE_SCALE: f64 = 5.0;

const PROVIDER: &str = "fal";

/// HTTP client for fal.ai.
pub struct FalProvider {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl FalProvider {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, api_key, FAL_FIBO_URL))
    }

    pub fn with_client(
        client: reqwest::Client,
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }

    /// JSON body for a generation request. Structured prompts are not
    /// forwarded.
    pub fn request_body(request: &GenerationRequest) -> Value {
        let mut body = json!({
            "prompt": request.prompt,
            "image_size": request.image_size.fal_size(),
            "num_inference_steps": request.quality_steps,
            "guidance_scale": FAL_GUIDANCE_SCALE,
        });
        if let Some(negative) = &request.negative_prompt {
            body["negative_prompt"] = Value::String(negative.clone());
        }
        if let Some(seed) = request.seed {
            body["seed"] = json!(seed);
        }
        body
    }

    /// Parse a raw JSON response body.
    pub fn parse_body(body: &str) -> Result<GenerationResult, ProviderError> {
        serde_json::from_str(body).map_err(|e| ProviderError::UnexpectedResponse {
            provider: PROVIDER,
            detail: e.to_string(),
        })
    }
}

#[async_trait]
impl GenerationProvider for FalProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn supports_structured_prompt(&self) -> bool {
        false
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, ProviderError> {
        tracing::debug!(seed = ?request.seed, "Sending fal.ai generation request");

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Key {}", self.api_key))
            .json(&Self::request_body(request))
            .send()
            .await?;

        let mut result: GenerationResult = http::parse_response(PROVIDER, response).await?;
        if result.images.is_empty() {
            return Err(ProviderError::UnexpectedResponse {
                provider: PROVIDER,
                detail: "response contained no images".to_string(),
            });
        }
        if result.prompt.is_none() {
            result.prompt = Some(request.prompt.clone());
        }
        Ok(result)
    }
}
