//! Prompt assembly.
//!
//! Pure and deterministic: system instructions, then the retrieved context
//! joined in rank order, then the question. No truncation happens here;
//! size limits belong to the generation service and its transport.

use crate::pipeline::ContextChunk;

/// Default system instructions for answering over retrieved context.
pub const DEFAULT_SYSTEM: &str = "You are a helpful assistant. Answer the question using only the provided context. \
     If the context does not contain relevant information, say so. Do not invent facts.";

/// Default separator between context chunks.
pub const DEFAULT_CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Assemble the full prompt. With no context chunks the context block is
/// simply empty; the question and system text always appear verbatim.
pub fn build_prompt(
    question: &str,
    context_chunks: &[ContextChunk],
    system: &str,
    context_separator: &str,
) -> String {
    let context_block = context_chunks
        .iter()
        .map(|chunk| chunk.text.as_str())
        .collect::<Vec<_>>()
        .join(context_separator);

    format!(
        "{}\n\n## Context\n{}\n\n## Question\n{}",
        system, context_block, question
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(id: &str, text: &str) -> ContextChunk {
        ContextChunk {
            id: id.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn contains_question_and_system_verbatim() {
        let chunks = vec![ctx("c1", "chunk one"), ctx("c2", "chunk two")];
        let prompt = build_prompt(
            "How often should I check my blood pressure?",
            &chunks,
            DEFAULT_SYSTEM,
            DEFAULT_CONTEXT_SEPARATOR,
        );

        assert!(prompt.contains(DEFAULT_SYSTEM));
        assert!(prompt.contains("How often should I check my blood pressure?"));
        assert!(prompt.contains("chunk one\n\n---\n\nchunk two"));
    }

    #[test]
    fn preserves_retrieval_order() {
        let chunks = vec![ctx("c2", "second best"), ctx("c1", "top match")];
        let prompt = build_prompt("q", &chunks, "sys", " | ");
        assert!(prompt.contains("second best | top match"));
    }

    #[test]
    fn empty_context_block_is_empty_string() {
        let prompt = build_prompt("the question", &[], "the system", DEFAULT_CONTEXT_SEPARATOR);
        assert!(prompt.contains("## Context\n\n\n## Question"));
        assert!(prompt.contains("the question"));
        assert!(prompt.contains("the system"));
    }
}
