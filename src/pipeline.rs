//! The retrieve-then-generate pipeline.
//!
//! One question runs one linear chain: embed the query, find neighbors,
//! resolve neighbor ids to text, build the prompt, generate. Embedding and
//! index failures abort the chain; an empty context does not, and a
//! generation failure degrades into a placeholder answer so the caller
//! always has something to render.

use serde::{Deserialize, Serialize};

use crate::embeddings::{Embedder, EmbeddingClient};
use crate::error::RagError;
use crate::generation::GenerationClient;
use crate::prompt::{build_prompt, DEFAULT_CONTEXT_SEPARATOR, DEFAULT_SYSTEM};
use crate::store::ChunkLookup;
use crate::vector_search::NeighborSearchClient;

/// A resolved context chunk, in retrieval rank order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextChunk {
    pub id: String,
    pub text: String,
}

/// Orchestrates embedder, neighbor index, chunk lookup and generator.
///
/// Clients are injected at construction so the pipeline can be exercised
/// against fakes without live credentials.
pub struct RagPipeline<E, N, G>
where
    E: EmbeddingClient,
    N: NeighborSearchClient,
    G: GenerationClient,
{
    embedder: Embedder<E>,
    index: N,
    generator: G,
    default_top_k: usize,
}

impl<E, N, G> RagPipeline<E, N, G>
where
    E: EmbeddingClient,
    N: NeighborSearchClient,
    G: GenerationClient,
{
    pub fn new(embedding_client: E, index: N, generator: G, default_top_k: usize) -> Self {
        Self {
            embedder: Embedder::new(embedding_client),
            index,
            generator,
            default_top_k: default_top_k.max(1),
        }
    }

    /// Embed the query, search the index and resolve neighbor ids to text.
    ///
    /// Ids the lookup cannot resolve are dropped silently; rank order is
    /// preserved for the rest. No context found is an empty vec, not an
    /// error. Embedding and index failures propagate.
    pub async fn retrieve(
        &self,
        query: &str,
        lookup: &dyn ChunkLookup,
        top_k: Option<usize>,
    ) -> Result<Vec<ContextChunk>, RagError> {
        let top_k = top_k.unwrap_or(self.default_top_k);

        let query_vector = self.embedder.embed_query(query).await?;
        let neighbors = self.index.find_neighbors(&query_vector, top_k).await?;

        let mut context = Vec::with_capacity(neighbors.len());
        for neighbor in &neighbors {
            match lookup.lookup(&neighbor.id).await {
                Some(text) => context.push(ContextChunk {
                    id: neighbor.id.clone(),
                    text,
                }),
                None => {
                    tracing::debug!("dropping unresolved chunk id {}", neighbor.id);
                }
            }
        }

        tracing::info!(
            "retrieved {} context chunks ({} neighbors) for query",
            context.len(),
            neighbors.len()
        );
        Ok(context)
    }

    /// Generate a completion for the prompt. A generation failure becomes a
    /// placeholder string carrying the error text, so the caller always gets
    /// a renderable answer.
    pub async fn generate(&self, prompt: &str) -> String {
        match self.generator.generate(prompt).await {
            Ok(answer) => answer,
            Err(err) => {
                tracing::warn!("generation failed: {}", err);
                format!("[Generation error: {}]", err)
            }
        }
    }

    /// Full question answering: retrieve, build the prompt, generate.
    /// Returns the answer together with the context chunks it was grounded
    /// on, so callers can show provenance.
    pub async fn query(
        &self,
        question: &str,
        lookup: &dyn ChunkLookup,
        top_k: Option<usize>,
        system: Option<&str>,
    ) -> Result<(String, Vec<ContextChunk>), RagError> {
        let context = self.retrieve(question, lookup, top_k).await?;
        let prompt = build_prompt(
            question,
            &context,
            system.unwrap_or(DEFAULT_SYSTEM),
            DEFAULT_CONTEXT_SEPARATOR,
        );
        let answer = self.generate(&prompt).await;
        Ok((answer, context))
    }
}
