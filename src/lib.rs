//! carerag — retrieval-augmented question answering core.
//!
//! This crate provides:
//! - `chunking`: deterministic, content-addressed text chunking
//! - `store` / `sqlite`: chunk id → text resolution, table-first
//! - `embeddings`, `vector_search`, `generation`: client seams for the
//!   external embedding, nearest-neighbor and generation services
//! - `vertex`: reqwest-backed Vertex AI implementations of those seams
//! - `pipeline`: the retrieve → prompt → generate orchestration
//!
//! Transport, auth and record storage live in the surrounding service; this
//! crate only turns a question into an answer with provenance.

pub mod chunking;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod generation;
pub mod ingest;
pub mod logging;
pub mod pipeline;
pub mod prompt;
pub mod sqlite;
pub mod store;
pub mod vector_search;
pub mod vertex;

pub use chunking::{chunk_by_fixed_size, chunk_by_sentences, Chunk, ChunkMetadata};
pub use config::RagConfig;
pub use error::RagError;
pub use pipeline::{ContextChunk, RagPipeline};
pub use store::{ChunkLookup, ChunkStore};
