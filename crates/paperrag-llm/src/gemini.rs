use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use paperrag_core::config::LlmSettings;
use paperrag_core::error::{Error, Result};
use paperrag_core::response::ModelResponse;
use paperrag_core::traits::GenerativeModel;

/// Non-streaming client for `POST {base_url}/v1beta/models/{model}:generateContent`.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [TextPart<'a>; 1],
}

#[derive(Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

impl GeminiClient {
    pub fn new(settings: &LlmSettings) -> Result<Self> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::InvalidConfig("llm.api_key is required".to_string()))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| Error::InvalidConfig(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            api_key,
            model: settings.model.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<ModelResponse> {
        let body = GenerateRequest {
            contents: [Content { role: "user", parts: [TextPart { text: prompt }] }],
        };
        let started = Instant::now();
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::synthesis(format!("model request timed out: {}", e))
                } else {
                    Error::synthesis(format!("model request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(model = %self.model, %status, "generateContent returned an error");
            return Err(Error::synthesis(format!("model API error {}: {}", status, error_text)));
        }

        let decoded: ModelResponse = response
            .json()
            .await
            .map_err(|e| Error::synthesis(format!("unrecognized model response: {}", e)))?;
        debug!(model = %self.model, elapsed_ms = started.elapsed().as_millis() as u64, "generateContent done");
        Ok(decoded)
    }
}
