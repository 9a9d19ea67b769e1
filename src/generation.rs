//! Generation client seam.

use async_trait::async_trait;

use crate::error::RagError;

/// External text generation service. Produces a completion for a prompt;
/// a response with no candidate is an empty string, not an error. Errors
/// from this trait are folded into a placeholder answer by the pipeline,
/// never surfaced to the end user as a failure.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, RagError>;
}
