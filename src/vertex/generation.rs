use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::model_url;
use crate::config::RagConfig;
use crate::error::RagError;
use crate::generation::GenerationClient;

pub struct VertexGenerationClient {
    client: Client,
    url: String,
    access_token: String,
}

impl VertexGenerationClient {
    pub fn new(config: &RagConfig) -> Self {
        Self {
            client: Client::new(),
            url: model_url(
                &config.api_host(),
                &config.project,
                &config.location,
                &config.llm_model,
                "generateContent",
            ),
            access_token: config.access_token.clone(),
        }
    }
}

#[async_trait]
impl GenerationClient for VertexGenerationClient {
    async fn generate(&self, prompt: &str) -> Result<String, RagError> {
        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }],
            }],
        });

        let res = self
            .client
            .post(&self.url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| RagError::service("generation", e))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(RagError::Service {
                service: "generation",
                message: format!("{}: {}", status, text),
            });
        }

        let payload: Value = res
            .json()
            .await
            .map_err(|e| RagError::service("generation", e))?;

        // No candidate produced is an empty answer, not an error.
        let completion = payload["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .unwrap_or_default()
            .trim()
            .to_string();

        Ok(completion)
    }
}
