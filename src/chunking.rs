//! Deterministic text chunking.
//!
//! Produces chunks with stable, content-addressed ids so that re-ingesting
//! identical content upserts the same rows instead of duplicating them.
//! Two strategies are provided:
//! - `chunk_by_fixed_size`: separator-aware accumulation with character overlap
//! - `chunk_by_sentences`: sliding sentence windows with sentence overlap

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Number of leading characters of the chunk text that participate in the id.
const ID_PREFIX_CHARS: usize = 200;
/// Length of the hex id string.
const ID_HEX_CHARS: usize = 24;

/// Provenance carried alongside each chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Source identifier (document name, URL, etc.).
    pub source: String,
    /// Position of the chunk within its source.
    pub chunk_index: usize,
}

/// A bounded slice of source text, embedded and retrieved independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Stable content-addressed id, see [`chunk_id`].
    pub id: String,
    /// The text content.
    pub text: String,
    pub metadata: ChunkMetadata,
}

impl Chunk {
    fn new(text: String, source: &str, index: usize) -> Self {
        Self {
            id: chunk_id(&text, source, index),
            text,
            metadata: ChunkMetadata {
                source: source.to_string(),
                chunk_index: index,
            },
        }
    }
}

/// Stable chunk id: sha256 over `"{source}:{index}:{first 200 chars}"`,
/// truncated to 24 hex characters.
///
/// Only the first 200 characters of the text participate, so two chunks
/// sharing source, index and prefix collide and upsert to a single row.
/// That is the intended idempotency contract, kept as-is.
pub fn chunk_id(text: &str, source: &str, index: usize) -> String {
    let prefix: String = text.chars().take(ID_PREFIX_CHARS).collect();
    let raw = format!("{}:{}:{}", source, index, prefix);
    let digest = Sha256::digest(raw.as_bytes());
    hex::encode(digest)[..ID_HEX_CHARS].to_string()
}

/// Split text into overlapping chunks of at most `chunk_size` characters.
///
/// The text is split on `separator` into units; units accumulate into a
/// buffer that is emitted once the next unit would overflow `chunk_size`.
/// The next buffer is seeded with the trailing `chunk_overlap` characters of
/// the emitted text, a raw character slice that may cut mid-unit. A single
/// unit longer than `chunk_size` is emitted whole, never split.
///
/// Empty or whitespace-only input yields no chunks. All lengths are measured
/// in characters, not bytes.
pub fn chunk_by_fixed_size(
    text: &str,
    source_id: &str,
    chunk_size: usize,
    chunk_overlap: usize,
    separator: &str,
) -> Vec<Chunk> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let parts: Vec<&str> = if separator.is_empty() {
        vec![text]
    } else {
        text.split(separator).collect()
    };
    let sep_chars = separator.chars().count();

    let mut chunks = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut current_len = 0usize;
    let mut index = 0usize;

    for part in parts {
        let part_len = part.chars().count() + if current.is_empty() { 0 } else { sep_chars };

        if current_len + part_len > chunk_size && !current.is_empty() {
            let text_chunk = current.join(separator);
            chunks.push(Chunk::new(text_chunk.clone(), source_id, index));
            index += 1;

            if chunk_overlap > 0 {
                let overlap = tail_chars(&text_chunk, chunk_overlap);
                current_len = overlap.chars().count();
                current = if overlap.is_empty() { Vec::new() } else { vec![overlap] };
            } else {
                current = Vec::new();
                current_len = 0;
            }
        }

        current.push(part.to_string());
        current_len += part_len;
    }

    if !current.is_empty() {
        chunks.push(Chunk::new(current.join(separator), source_id, index));
    }

    chunks
}

/// Split text into sentence windows of `max_sentences`, sharing
/// `chunk_overlap_sentences` sentences between consecutive windows.
///
/// The window start advances by `max_sentences - chunk_overlap_sentences`,
/// clamped to at least 1 so the loop terminates even when the overlap is as
/// large as the window. A window ending at the last sentence is final.
pub fn chunk_by_sentences(
    text: &str,
    source_id: &str,
    max_sentences: usize,
    chunk_overlap_sentences: usize,
) -> Vec<Chunk> {
    let sentences = split_sentences(text);
    if sentences.is_empty() {
        return Vec::new();
    }

    let max_sentences = max_sentences.max(1);
    let advance = max_sentences.saturating_sub(chunk_overlap_sentences).max(1);

    let mut chunks = Vec::new();
    let mut start = 0usize;
    let mut index = 0usize;

    loop {
        let end = (start + max_sentences).min(sentences.len());
        let text_chunk = sentences[start..end].join(" ");
        chunks.push(Chunk::new(text_chunk, source_id, index));
        index += 1;

        if end >= sentences.len() {
            break;
        }
        start += advance;
    }

    chunks
}

/// Split on sentence-ending punctuation followed by whitespace. The
/// punctuation stays with its sentence; surrounding whitespace is trimmed
/// and empty sentences are dropped.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') && chars.peek().is_some_and(|n| n.is_whitespace()) {
            while chars.peek().is_some_and(|n| n.is_whitespace()) {
                chars.next();
            }
            push_trimmed(&mut sentences, &current);
            current.clear();
        }
    }
    push_trimmed(&mut sentences, &current);

    sentences
}

fn push_trimmed(sentences: &mut Vec<String>, raw: &str) {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
}

/// Last `n` characters of `text` (the whole text if shorter).
fn tail_chars(text: &str, n: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    chars[chars.len().saturating_sub(n)..].iter().collect()
}
