//! Nearest-neighbor index client seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RagError;

/// One ranked match from the index: chunk id plus distance in the index's
/// own metric. The index decides the ordering; callers must preserve it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub id: String,
    pub distance: f64,
}

/// External approximate-nearest-neighbor service.
///
/// Returns up to `top_k` neighbors, best match first. Zero neighbors is a
/// valid result, not an error.
#[async_trait]
pub trait NeighborSearchClient: Send + Sync {
    async fn find_neighbors(
        &self,
        query_vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<Neighbor>, RagError>;
}
