//! Document ingestion into the persistent chunk table.
//!
//! Runs the fixed-size chunker over each document and upserts the chunks by
//! id. Stable ids make the whole operation idempotent: re-ingesting the
//! same documents rewrites the same rows. Building and deploying the vector
//! index over the resulting embeddings stays external to this crate.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::chunking::chunk_by_fixed_size;
use crate::config::RagConfig;
use crate::error::RagError;
use crate::sqlite::SqliteChunkTable;

/// A source document queued for ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Source identifier, carried into every chunk's metadata.
    pub source: String,
    pub title: String,
    pub text: String,
}

/// Number of chunks written per document, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub per_document: Vec<(String, usize)>,
    pub total_chunks: usize,
}

/// Chunk every document with the configured size/overlap and upsert the
/// chunks into the table, one transaction per document.
pub async fn ingest_documents(
    documents: &[Document],
    table: &SqliteChunkTable,
    config: &RagConfig,
) -> Result<IngestReport, RagError> {
    let mut per_document = Vec::with_capacity(documents.len());
    let mut total_chunks = 0;

    for document in documents {
        let chunks = chunk_by_fixed_size(
            &document.text,
            &document.source,
            config.chunk_size,
            config.chunk_overlap,
            "\n",
        );

        let rows: Vec<(String, String, String, Option<serde_json::Value>)> = chunks
            .iter()
            .map(|chunk| {
                (
                    chunk.id.clone(),
                    chunk.text.clone(),
                    chunk.metadata.source.clone(),
                    Some(json!({
                        "source": chunk.metadata.source,
                        "chunk_index": chunk.metadata.chunk_index,
                        "title": document.title,
                    })),
                )
            })
            .collect();

        table.upsert_batch(&rows).await?;
        tracing::info!("ingested '{}': {} chunks", document.source, chunks.len());

        total_chunks += chunks.len();
        per_document.push((document.source.clone(), chunks.len()));
    }

    Ok(IngestReport {
        per_document,
        total_chunks,
    })
}
