use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    chunker::Chunk,
    errors::{ChunkingError, ChunkingResult},
};

/// What happened to a single chunk on its way through the annotation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// The service answered; holds the normalised response.
    Annotated(String),
    /// The chunk was deliberately not sent (e.g. it is empty).
    Unchanged,
    /// The request failed; holds a printable reason.
    Failed { reason: String },
}

/// The result for one chunk, tied back to the chunk it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationResult<'a> {
    pub chunk: Chunk<'a>,
    pub outcome: ChunkOutcome,
}

impl<'a> AnnotationResult<'a> {
    pub fn annotated(chunk: Chunk<'a>, text: String) -> Self {
        Self {
            chunk,
            outcome: ChunkOutcome::Annotated(text),
        }
    }

    pub fn unchanged(chunk: Chunk<'a>) -> Self {
        Self {
            chunk,
            outcome: ChunkOutcome::Unchanged,
        }
    }

    pub fn failed(chunk: Chunk<'a>, reason: impl Into<String>) -> Self {
        Self {
            chunk,
            outcome: ChunkOutcome::Failed {
                reason: reason.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self.outcome, ChunkOutcome::Failed { .. })
    }
}

/// How a failed chunk is treated at reassembly time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackPolicy {
    /// Substitute the chunk's original text at its position.
    #[default]
    Fallback,
    /// Any failed chunk fails the whole file.
    FailFile,
}

/// Output of a reassembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reassembled {
    pub body: String,
    /// Sequence numbers whose original text was substituted.
    pub fallbacks: Vec<usize>,
}

impl Reassembled {
    pub fn is_complete(&self) -> bool {
        self.fallbacks.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Reassembler {
    policy: FallbackPolicy,
}

impl Reassembler {
    pub fn new(policy: FallbackPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> FallbackPolicy {
        self.policy
    }

    /// Concatenate results in sequence order with no separators.
    pub fn reassemble(&self, results: &[AnnotationResult<'_>]) -> ChunkingResult<Reassembled> {
        let mut ordered: Vec<&AnnotationResult<'_>> = results.iter().collect();
        ordered.sort_by_key(|result| result.chunk.sequence);

        let capacity = ordered.iter().map(|r| r.chunk.len()).sum();
        let mut body = String::with_capacity(capacity);
        let mut fallbacks = Vec::new();

        for result in ordered {
            match &result.outcome {
                ChunkOutcome::Annotated(text) => body.push_str(text),
                ChunkOutcome::Unchanged => body.push_str(result.chunk.text),
                ChunkOutcome::Failed { reason } => match self.policy {
                    FallbackPolicy::Fallback => {
                        warn!(
                            chunk = result.chunk.sequence,
                            %reason,
                            "Keeping original text for failed chunk"
                        );
                        body.push_str(result.chunk.text);
                        fallbacks.push(result.chunk.sequence);
                    }
                    FallbackPolicy::FailFile => {
                        return Err(ChunkingError::ChunkFailed {
                            sequence: result.chunk.sequence,
                            reason: reason.clone(),
                        });
                    }
                },
            }
        }

        Ok(Reassembled { body, fallbacks })
    }
}

/// Make a service response safe to splice back in place of `original`.
///
/// A response wrapped in a single markdown code fence is unwrapped, and the
/// line terminator state of `original` is mirrored so neighbouring chunks
/// never fuse or gain blank lines.
pub fn normalize_response(original: &str, response: &str) -> String {
    let mut text = strip_code_fence(response)
        .trim_end_matches(['\r', '\n'])
        .to_string();

    if original.ends_with("\r\n") {
        text.push_str("\r\n");
    } else if original.ends_with('\n') {
        text.push('\n');
    }

    text
}

fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    if trimmed.len() < 6 || !trimmed.starts_with("```") || !trimmed.ends_with("```") {
        return response;
    }

    let Some(first_newline) = trimmed.find('\n') else {
        return response;
    };
    let inner = &trimmed[first_newline + 1..trimmed.len() - 3];
    if inner.contains("```") {
        return response;
    }
    inner
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fence_single_block() {
        assert_eq!(strip_code_fence("```python\nx = 1\n```"), "x = 1\n");
    }

    #[test]
    fn test_strip_code_fence_leaves_nested_fences() {
        let text = "```\na\n```\nmiddle\n```\nb\n```";
        assert_eq!(strip_code_fence(text), text);
    }

    #[test]
    fn test_strip_code_fence_plain_text() {
        assert_eq!(strip_code_fence("x = 1\n"), "x = 1\n");
    }
}
