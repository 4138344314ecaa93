//! BRIA platform v2 client (`/image/generate`, synchronous mode).
//!
//! The first shot of a sequence is sent as a plain text prompt. BRIA
//! answers with a structured prompt describing the image; follow-up shots
//! send that structured prompt back together with a short refinement
//! instruction in `prompt`.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ProviderError;
use crate::http;
use crate::provider::GenerationProvider;
use crate::request::{GeneratedImage, GenerationRequest, GenerationResult};

/// Production endpoint for synchronous generation.
pub const BRIA_GENERATE_URL: &str = "https://engine.prod.bria-api.com/v2/image/generate";

/// Model version requested from BRIA.
pub const BRIA_MODEL_VERSION: &str = "FIBO";

const PROVIDER: &str = "bria";

/// HTTP client for the BRIA generation API.
pub struct BriaProvider {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct BriaResponse {
    result: Option<BriaResultBody>,
}

#[derive(Debug, Deserialize)]
struct BriaResultBody {
    image_url: String,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    structured_prompt: Option<Value>,
}

impl BriaProvider {
    /// Create a client against the production endpoint.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, api_key, BRIA_GENERATE_URL))
    }

    /// Create a client reusing an existing [`reqwest::Client`] and endpoint.
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

    /// JSON body for a generation request.
    pub fn request_body(request: &GenerationRequest) -> Value {
        let mut body = json!({
            "model_version": BRIA_MODEL_VERSION,
            "aspect_ratio": request.image_size.aspect_ratio(),
            "num_steps": request.quality_steps,
            "sync": true,
            "prompt": request.prompt,
        });
        if let Some(structured) = &request.structured_prompt {
            body["structured_prompt"] = Value::String(structured.clone());
        }
        if let Some(negative) = &request.negative_prompt {
            body["negative_prompt"] = Value::String(negative.clone());
        }
        if let Some(seed) = request.seed {
            body["seed"] = json!(seed);
        }
        body
    }

    /// Interpret a decoded response body.
    fn into_result(
        response: BriaResponse,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, ProviderError> {
        let result = response.result.ok_or_else(|| ProviderError::UnexpectedResponse {
            provider: PROVIDER,
            detail: "missing `result` object".to_string(),
        })?;

        let structured_prompt = match result.structured_prompt {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s),
            Some(other) => Some(other.to_string()),
        };

        let (width, height) = request.image_size.dimensions();
        Ok(GenerationResult {
            images: vec![GeneratedImage {
                url: result.image_url,
                width,
                height,
                content_type: "image/png".to_string(),
            }],
            seed: result.seed.or(request.seed).unwrap_or(0),
            prompt: Some(request.prompt.clone()),
            structured_prompt,
        })
    }

    /// Parse a raw JSON response body. Exposed for tests and offline replay.
    pub fn parse_body(
        body: &str,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, ProviderError> {
        let response: BriaResponse =
            serde_json::from_str(body).map_err(|e| ProviderError::UnexpectedResponse {
                provider: PROVIDER,
                detail: e.to_string(),
            })?;
        Self::into_result(response, request)
    }
}

#[async_trait]
impl GenerationProvider for BriaProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, ProviderError> {
        tracing::debug!(
            has_structured_prompt = request.structured_prompt.is_some(),
            seed = ?request.seed,
            "Sending BRIA generation request",
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("api_token", &self.api_key)
            .json(&Self::request_body(request))
            .send()
            .await?;

        let body: BriaResponse = http::parse_response(PROVIDER, response).await?;
        Self::into_result(body, request)
    }
}
