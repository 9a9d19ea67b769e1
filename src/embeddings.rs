//! Embedding client seam and the `Embedder` wrapper.
//!
//! Documents and queries are embedded with different task intents; the two
//! produce differently conditioned vectors and retrieval quality depends on
//! matching intent to role. An embedding failure is a hard error here: the
//! pipeline cannot retrieve anything without a vector.

use async_trait::async_trait;

use crate::chunking::Chunk;
use crate::error::RagError;

/// Task intent sent with every embedding request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskType {
    RetrievalDocument,
    RetrievalQuery,
}

impl TaskType {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskType::RetrievalDocument => "RETRIEVAL_DOCUMENT",
            TaskType::RetrievalQuery => "RETRIEVAL_QUERY",
        }
    }
}

/// One embedding call: model, inputs, intent and target dimensionality.
#[derive(Debug, Clone)]
pub struct EmbeddingRequest {
    pub texts: Vec<String>,
    pub task: TaskType,
    /// Optional document title, only meaningful for document embedding.
    pub title: Option<String>,
}

/// External embedding service. One vector per input text, order preserved.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    async fn embed(&self, request: EmbeddingRequest) -> Result<Vec<Vec<f32>>, RagError>;
}

/// High-level embedding operations over an [`EmbeddingClient`].
pub struct Embedder<C: EmbeddingClient> {
    client: C,
}

impl<C: EmbeddingClient> Embedder<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Embed document chunks for indexing (`RETRIEVAL_DOCUMENT`).
    pub async fn embed_documents(
        &self,
        texts: Vec<String>,
        title: Option<&str>,
    ) -> Result<Vec<Vec<f32>>, RagError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.client
            .embed(EmbeddingRequest {
                texts,
                task: TaskType::RetrievalDocument,
                title: title.map(str::to_string),
            })
            .await
    }

    /// Embed a single query for retrieval (`RETRIEVAL_QUERY`).
    pub async fn embed_query(&self, query: &str) -> Result<Vec<f32>, RagError> {
        let mut vectors = self
            .client
            .embed(EmbeddingRequest {
                texts: vec![query.to_string()],
                task: TaskType::RetrievalQuery,
                title: None,
            })
            .await?;

        if vectors.is_empty() {
            return Err(RagError::service(
                "embedding",
                "empty response for query embedding",
            ));
        }
        Ok(vectors.swap_remove(0))
    }

    /// Embed chunks in fixed-size sequential batches, pairing chunk ids with
    /// vectors by batch-local position. Batches stay sequential to respect
    /// external payload and rate limits.
    pub async fn chunks_to_embeddings(
        &self,
        chunks: &[Chunk],
        batch_size: usize,
    ) -> Result<Vec<(String, Vec<f32>)>, RagError> {
        let batch_size = batch_size.max(1);
        let mut out = Vec::with_capacity(chunks.len());

        for batch in chunks.chunks(batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let vectors = self.embed_documents(texts, None).await?;
            for (chunk, vector) in batch.iter().zip(vectors) {
                out.push((chunk.id.clone(), vector));
            }
        }

        Ok(out)
    }
}

/// Default batch size for [`Embedder::chunks_to_embeddings`].
pub const DEFAULT_EMBED_BATCH_SIZE: usize = 100;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::chunk_by_fixed_size;
    use std::sync::Mutex;

    /// Fake client that records every request and returns per-input vectors
    /// encoding the batch-local position.
    struct RecordingClient {
        requests: Mutex<Vec<EmbeddingRequest>>,
        fail: bool,
    }

    impl RecordingClient {
        fn new(fail: bool) -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                fail,
            }
        }
    }

    #[async_trait]
    impl EmbeddingClient for RecordingClient {
        async fn embed(&self, request: EmbeddingRequest) -> Result<Vec<Vec<f32>>, RagError> {
            if self.fail {
                return Err(RagError::service("embedding", "service down"));
            }
            let vectors = (0..request.texts.len())
                .map(|i| vec![i as f32, request.texts[i].len() as f32])
                .collect();
            self.requests.lock().unwrap().push(request);
            Ok(vectors)
        }
    }

    #[tokio::test]
    async fn query_and_document_use_distinct_task_types() {
        let embedder = Embedder::new(RecordingClient::new(false));

        embedder.embed_query("what is my blood pressure?").await.unwrap();
        embedder
            .embed_documents(vec!["doc text".to_string()], Some("Guidelines"))
            .await
            .unwrap();

        let requests = embedder.client.requests.lock().unwrap();
        assert_eq!(requests[0].task, TaskType::RetrievalQuery);
        assert_eq!(requests[0].title, None);
        assert_eq!(requests[1].task, TaskType::RetrievalDocument);
        assert_eq!(requests[1].title.as_deref(), Some("Guidelines"));
    }

    #[tokio::test]
    async fn empty_document_list_skips_the_service() {
        let embedder = Embedder::new(RecordingClient::new(false));
        let vectors = embedder.embed_documents(Vec::new(), None).await.unwrap();
        assert!(vectors.is_empty());
        assert!(embedder.client.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn chunks_are_batched_and_paired_by_position() {
        let embedder = Embedder::new(RecordingClient::new(false));
        let text = "a. b. c. d. e. f. g.".replace(". ", ".\n");
        let chunks = chunk_by_fixed_size(&text, "doc", 2, 0, "\n");
        assert_eq!(chunks.len(), 7);

        let pairs = embedder.chunks_to_embeddings(&chunks, 3).await.unwrap();
        assert_eq!(pairs.len(), 7);

        let requests = embedder.client.requests.lock().unwrap();
        let batch_sizes: Vec<usize> = requests.iter().map(|r| r.texts.len()).collect();
        assert_eq!(batch_sizes, vec![3, 3, 1]);

        // positional pairing: each id belongs to the chunk at the same offset
        for (chunk, (id, vector)) in chunks.iter().zip(&pairs) {
            assert_eq!(&chunk.id, id);
            assert_eq!(vector[1], chunk.text.len() as f32);
        }
    }

    #[tokio::test]
    async fn zero_batch_size_is_clamped() {
        let embedder = Embedder::new(RecordingClient::new(false));
        let chunks = chunk_by_fixed_size("a\nb\nc", "doc", 1, 0, "\n");
        let pairs = embedder.chunks_to_embeddings(&chunks, 0).await.unwrap();
        assert_eq!(pairs.len(), chunks.len());
    }

    #[tokio::test]
    async fn service_failure_propagates() {
        let embedder = Embedder::new(RecordingClient::new(true));
        let err = embedder.embed_query("anything").await.unwrap_err();
        assert!(matches!(err, RagError::Service { service: "embedding", .. }));
    }
}
