use std::env;

use anyhow::Context;

use carerag::pipeline::RagPipeline;
use carerag::store::ChunkStore;
use carerag::vertex::{VertexEmbeddingClient, VertexGenerationClient, VertexVectorSearchClient};
use carerag::RagConfig;

/// One-shot retrieval-augmented query from the command line:
/// `carerag "How often should I check my blood pressure?"`.
///
/// Configuration comes from the environment; RAG_CHUNK_STORE_PATH may point
/// at a JSON chunk store used as the lookup fallback.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    carerag::logging::init();

    let question = env::args()
        .nth(1)
        .context("usage: carerag <question>")?;

    let config = RagConfig::from_env();

    let store = ChunkStore::new();
    if let Ok(path) = env::var("RAG_CHUNK_STORE_PATH") {
        if !store.load_from_path(&path) {
            tracing::warn!("continuing without a chunk store from {}", path);
        }
    }

    let pipeline = RagPipeline::new(
        VertexEmbeddingClient::new(&config),
        VertexVectorSearchClient::new(&config)?,
        VertexGenerationClient::new(&config),
        config.top_k,
    );

    let (answer, context) = pipeline.query(&question, &store, None, None).await?;

    println!("{}", answer);
    if !context.is_empty() {
        println!("\nSources:");
        for chunk in &context {
            println!("  [{}] {}", chunk.id, first_line(&chunk.text));
        }
    }

    Ok(())
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default().trim()
}
