use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::RagConfig;
use crate::error::RagError;
use crate::vector_search::{Neighbor, NeighborSearchClient};

#[derive(Debug)]
pub struct VertexVectorSearchClient {
    client: Client,
    url: String,
    access_token: String,
    deployed_index_id: String,
}

impl VertexVectorSearchClient {
    /// Fails immediately when the project or index endpoint is not
    /// configured; a misconfigured index is fatal, never retried.
    pub fn new(config: &RagConfig) -> Result<Self, RagError> {
        if config.project.trim().is_empty() || config.index_endpoint_id.trim().is_empty() {
            return Err(RagError::Configuration(
                "GOOGLE_CLOUD_PROJECT and VECTOR_SEARCH_INDEX_ENDPOINT_ID must be set".to_string(),
            ));
        }

        let url = format!(
            "{}/v1/projects/{}/locations/{}/indexEndpoints/{}:findNeighbors",
            config.api_host(),
            config.project,
            config.location,
            config.index_endpoint_id,
        );

        Ok(Self {
            client: Client::new(),
            url,
            access_token: config.access_token.clone(),
            deployed_index_id: config.deployed_index_id.clone(),
        })
    }
}

#[async_trait]
impl NeighborSearchClient for VertexVectorSearchClient {
    async fn find_neighbors(
        &self,
        query_vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<Neighbor>, RagError> {
        let body = json!({
            "deployedIndexId": self.deployed_index_id,
            "queries": [{
                "datapoint": { "featureVector": query_vector },
                "neighborCount": top_k,
            }],
        });

        let res = self
            .client
            .post(&self.url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| RagError::service("vector search", e))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(RagError::Service {
                service: "vector search",
                message: format!("{}: {}", status, text),
            });
        }

        let payload: Value = res
            .json()
            .await
            .map_err(|e| RagError::service("vector search", e))?;

        // One query vector in, so only the first per-query result matters.
        let mut neighbors = Vec::new();
        if let Some(matches) = payload["nearestNeighbors"][0]["neighbors"].as_array() {
            for entry in matches {
                let Some(id) = entry["datapoint"]["datapointId"].as_str() else {
                    continue;
                };
                neighbors.push(Neighbor {
                    id: id.to_string(),
                    distance: entry["distance"].as_f64().unwrap_or_default(),
                });
            }
        }

        Ok(neighbors)
    }
}
