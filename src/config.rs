//! Pipeline configuration.
//!
//! Defaults match the deployed service; every field can be overridden from
//! the environment via [`RagConfig::from_env`].

use std::env;

use serde::{Deserialize, Serialize};

/// Configuration for the retrieval pipeline and its Vertex AI clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    /// Google Cloud project id. Required for any live service call.
    pub project: String,
    /// Google Cloud region hosting the models and the index.
    pub location: String,
    /// OAuth bearer token for the Vertex REST endpoints.
    pub access_token: String,
    /// Embedding model name.
    pub embedding_model: String,
    /// Output dimensionality requested from the embedding model.
    pub embedding_dimensions: usize,
    /// Generation model name.
    pub llm_model: String,
    /// Vector Search index endpoint id.
    pub index_endpoint_id: String,
    /// Deployed index id within the endpoint.
    pub deployed_index_id: String,
    /// Default number of neighbors to request.
    pub top_k: usize,
    /// Maximum chunk size in characters for fixed-size chunking.
    pub chunk_size: usize,
    /// Overlap between consecutive fixed-size chunks, in characters.
    pub chunk_overlap: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            project: String::new(),
            location: "us-central1".to_string(),
            access_token: String::new(),
            embedding_model: "text-embedding-005".to_string(),
            embedding_dimensions: 768,
            llm_model: "gemini-1.5-flash-001".to_string(),
            index_endpoint_id: String::new(),
            deployed_index_id: "default".to_string(),
            top_k: 10,
            chunk_size: 512,
            chunk_overlap: 50,
        }
    }
}

impl RagConfig {
    /// Build a configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            project: env_or("GOOGLE_CLOUD_PROJECT", defaults.project),
            location: env_or("GOOGLE_CLOUD_LOCATION", defaults.location),
            access_token: env_or("GOOGLE_ACCESS_TOKEN", defaults.access_token),
            embedding_model: env_or("VERTEX_EMBEDDING_MODEL", defaults.embedding_model),
            embedding_dimensions: env_parse(
                "VERTEX_EMBEDDING_DIMENSIONS",
                defaults.embedding_dimensions,
            ),
            llm_model: env_or("VERTEX_RAG_LLM_MODEL", defaults.llm_model),
            index_endpoint_id: env_or(
                "VECTOR_SEARCH_INDEX_ENDPOINT_ID",
                defaults.index_endpoint_id,
            ),
            deployed_index_id: env_or(
                "VECTOR_SEARCH_DEPLOYED_INDEX_ID",
                defaults.deployed_index_id,
            ),
            top_k: env_parse("VECTOR_SEARCH_TOP_K", defaults.top_k),
            chunk_size: env_parse("RAG_CHUNK_SIZE", defaults.chunk_size),
            chunk_overlap: env_parse("RAG_CHUNK_OVERLAP", defaults.chunk_overlap),
        }
    }

    /// Regional Vertex AI API host, e.g. `https://us-central1-aiplatform.googleapis.com`.
    pub fn api_host(&self) -> String {
        format!("https://{}-aiplatform.googleapis.com", self.location)
    }
}

fn env_or(key: &str, default: String) -> String {
    match env::var(key) {
        Ok(val) if !val.trim().is_empty() => val,
        _ => default,
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|val| val.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_deployment() {
        let config = RagConfig::default();
        assert_eq!(config.location, "us-central1");
        assert_eq!(config.embedding_model, "text-embedding-005");
        assert_eq!(config.embedding_dimensions, 768);
        assert_eq!(config.top_k, 10);
        assert_eq!(config.chunk_size, 512);
        assert_eq!(config.chunk_overlap, 50);
    }

    #[test]
    fn api_host_uses_location() {
        let config = RagConfig {
            location: "europe-west1".to_string(),
            ..RagConfig::default()
        };
        assert_eq!(
            config.api_host(),
            "https://europe-west1-aiplatform.googleapis.com"
        );
    }
}
