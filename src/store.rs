//! Chunk id → text resolution.
//!
//! `ChunkStore` holds the in-memory map loaded from a JSON file and resolves
//! ids persistent-table-first when a [`SqliteChunkTable`] is attached. Any
//! table error falls back silently to the in-memory map; an id absent from
//! both is a miss, not an error.

use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;

use crate::sqlite::SqliteChunkTable;

/// Resolves a chunk id to its text. The pipeline only depends on this seam,
/// so tests can substitute a plain map for the real store.
#[async_trait]
pub trait ChunkLookup: Send + Sync {
    async fn lookup(&self, chunk_id: &str) -> Option<String>;
}

#[async_trait]
impl ChunkLookup for HashMap<String, String> {
    async fn lookup(&self, chunk_id: &str) -> Option<String> {
        self.get(chunk_id).cloned()
    }
}

/// In-memory chunk store with an optional persistent table in front.
#[derive(Default)]
pub struct ChunkStore {
    chunks: RwLock<HashMap<String, String>>,
    table: Option<SqliteChunkTable>,
}

impl ChunkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a persistent chunk table, consulted before the in-memory map.
    pub fn with_table(table: SqliteChunkTable) -> Self {
        Self {
            chunks: RwLock::new(HashMap::new()),
            table: Some(table),
        }
    }

    /// Number of chunks in the in-memory map.
    pub fn len(&self) -> usize {
        self.chunks.read().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace the entire in-memory map.
    pub fn replace(&self, chunks: HashMap<String, String>) {
        if let Ok(mut guard) = self.chunks.write() {
            *guard = chunks;
        }
    }

    /// Load the in-memory map from a JSON file.
    ///
    /// Accepted shapes: an object `{"chunk_id": "text", ...}` or an array of
    /// `{"id": ..., "text": ...}` objects. The map is only replaced once the
    /// whole file parsed; on an unreadable file, malformed JSON or an
    /// unsupported shape this logs a warning, keeps the previous map and
    /// returns `false`.
    pub fn load_from_path(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();

        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!("chunk store file {} unreadable: {}", path.display(), err);
                return false;
            }
        };

        let parsed: Value = match serde_json::from_str(&raw) {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::warn!("chunk store file {} is not valid JSON: {}", path.display(), err);
                return false;
            }
        };

        let Some(chunks) = map_from_value(parsed) else {
            tracing::warn!(
                "chunk store file {} must be an object or an array of {{id, text}} entries",
                path.display()
            );
            return false;
        };

        tracing::info!("chunk store loaded: {} chunks from {}", chunks.len(), path.display());
        self.replace(chunks);
        true
    }

    /// Resolve a chunk id to its text, table first, in-memory second.
    pub async fn get(&self, chunk_id: &str) -> Option<String> {
        if let Some(table) = &self.table {
            match table.get(chunk_id).await {
                Ok(Some(text)) => return Some(text),
                Ok(None) => {}
                Err(err) => {
                    tracing::debug!("table lookup failed for chunk {}: {}", chunk_id, err);
                }
            }
        }

        self.chunks
            .read()
            .ok()
            .and_then(|map| map.get(chunk_id).cloned())
    }
}

#[async_trait]
impl ChunkLookup for ChunkStore {
    async fn lookup(&self, chunk_id: &str) -> Option<String> {
        self.get(chunk_id).await
    }
}

fn map_from_value(value: Value) -> Option<HashMap<String, String>> {
    match value {
        Value::Object(entries) => Some(
            entries
                .into_iter()
                .map(|(id, text)| (id, value_to_text(text)))
                .collect(),
        ),
        Value::Array(items) => {
            let mut chunks = HashMap::new();
            for item in items {
                let Value::Object(entry) = item else { continue };
                let id = entry.get("id").map(|v| value_to_text(v.clone()));
                let text = entry.get("text").map(|v| value_to_text(v.clone()));
                if let (Some(id), Some(text)) = (id, text) {
                    chunks.insert(id, text);
                }
            }
            Some(chunks)
        }
        _ => None,
    }
}

fn value_to_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_store_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[tokio::test]
    async fn loads_object_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_store_file(&dir, "store.json", r#"{"c1": "alpha", "c2": "beta"}"#);

        let store = ChunkStore::new();
        assert!(store.load_from_path(&path));
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("c1").await.as_deref(), Some("alpha"));
        assert_eq!(store.get("missing").await, None);
    }

    #[tokio::test]
    async fn loads_array_shape_and_skips_incomplete_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_store_file(
            &dir,
            "store.json",
            r#"[{"id": "c1", "text": "alpha"}, {"id": "c2"}, {"text": "orphan"}, 42]"#,
        );

        let store = ChunkStore::new();
        assert!(store.load_from_path(&path));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("c1").await.as_deref(), Some("alpha"));
    }

    #[tokio::test]
    async fn malformed_json_keeps_previous_map() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_store_file(&dir, "good.json", r#"{"c1": "alpha"}"#);
        let bad = write_store_file(&dir, "bad.json", "{not json");
        let wrong_shape = write_store_file(&dir, "shape.json", r#""just a string""#);

        let store = ChunkStore::new();
        assert!(store.load_from_path(&good));
        assert!(!store.load_from_path(&bad));
        assert!(!store.load_from_path(&wrong_shape));
        assert_eq!(store.get("c1").await.as_deref(), Some("alpha"));
    }

    #[tokio::test]
    async fn missing_file_reports_failure() {
        let store = ChunkStore::new();
        assert!(!store.load_from_path("/nonexistent/store.json"));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn non_string_values_are_stringified() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_store_file(&dir, "store.json", r#"{"c1": 42}"#);

        let store = ChunkStore::new();
        assert!(store.load_from_path(&path));
        assert_eq!(store.get("c1").await.as_deref(), Some("42"));
    }

    #[tokio::test]
    async fn table_is_consulted_first() {
        let dir = tempfile::tempdir().unwrap();
        let table = SqliteChunkTable::with_path(dir.path().join("chunks.db"))
            .await
            .unwrap();
        table
            .upsert("c1", "from table", "doc", None)
            .await
            .unwrap();

        let store = ChunkStore::with_table(table);
        store.replace(HashMap::from([
            ("c1".to_string(), "from memory".to_string()),
            ("c2".to_string(), "memory only".to_string()),
        ]));

        assert_eq!(store.get("c1").await.as_deref(), Some("from table"));
        assert_eq!(store.get("c2").await.as_deref(), Some("memory only"));
        assert_eq!(store.get("c3").await, None);
    }
}
