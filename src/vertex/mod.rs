//! Vertex AI implementations of the service client seams.
//!
//! Each client wraps one REST endpoint with one method:
//! - `VertexEmbeddingClient`: text embedding via `:predict`
//! - `VertexVectorSearchClient`: neighbor lookup via `:findNeighbors`
//! - `VertexGenerationClient`: completion via `:generateContent`
//!
//! All three are constructed once from [`RagConfig`](crate::config::RagConfig)
//! and passed into the pipeline by reference; there is no hidden shared state.

mod embeddings;
mod generation;
mod vector_search;

pub use embeddings::VertexEmbeddingClient;
pub use generation::VertexGenerationClient;
pub use vector_search::VertexVectorSearchClient;

/// URL of a publisher model endpoint, e.g. `.../models/text-embedding-005:predict`.
fn model_url(host: &str, project: &str, location: &str, model: &str, verb: &str) -> String {
    format!(
        "{}/v1/projects/{}/locations/{}/publishers/google/models/{}:{}",
        host, project, location, model, verb
    )
}
