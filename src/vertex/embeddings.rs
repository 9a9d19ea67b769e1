use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::model_url;
use crate::config::RagConfig;
use crate::embeddings::{EmbeddingClient, EmbeddingRequest};
use crate::error::RagError;

pub struct VertexEmbeddingClient {
    client: Client,
    url: String,
    access_token: String,
    dimensions: usize,
}

impl VertexEmbeddingClient {
    pub fn new(config: &RagConfig) -> Self {
        Self {
            client: Client::new(),
            url: model_url(
                &config.api_host(),
                &config.project,
                &config.location,
                &config.embedding_model,
                "predict",
            ),
            access_token: config.access_token.clone(),
            dimensions: config.embedding_dimensions,
        }
    }
}

#[async_trait]
impl EmbeddingClient for VertexEmbeddingClient {
    async fn embed(&self, request: EmbeddingRequest) -> Result<Vec<Vec<f32>>, RagError> {
        let instances: Vec<Value> = request
            .texts
            .iter()
            .map(|text| {
                let mut instance = json!({
                    "content": text,
                    "task_type": request.task.as_str(),
                });
                if let (Some(obj), Some(title)) = (instance.as_object_mut(), &request.title) {
                    obj.insert("title".to_string(), json!(title));
                }
                instance
            })
            .collect();

        let body = json!({
            "instances": instances,
            "parameters": { "outputDimensionality": self.dimensions },
        });

        let res = self
            .client
            .post(&self.url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| RagError::service("embedding", e))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(RagError::Service {
                service: "embedding",
                message: format!("{}: {}", status, text),
            });
        }

        let payload: Value = res.json().await.map_err(|e| RagError::service("embedding", e))?;

        let mut vectors = Vec::new();
        if let Some(predictions) = payload["predictions"].as_array() {
            for prediction in predictions {
                if let Some(values) = prediction["embeddings"]["values"].as_array() {
                    let vector: Vec<f32> = values
                        .iter()
                        .filter_map(|v| v.as_f64().map(|f| f as f32))
                        .collect();
                    vectors.push(vector);
                }
            }
        }

        if vectors.len() != request.texts.len() {
            return Err(RagError::Service {
                service: "embedding",
                message: format!(
                    "expected {} vectors, got {}",
                    request.texts.len(),
                    vectors.len()
                ),
            });
        }

        Ok(vectors)
    }
}
