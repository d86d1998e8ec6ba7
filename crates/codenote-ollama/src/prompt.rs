//! Instructional envelopes wrapped around each chunk
//!
//! Both modes share one request shape; only the wording and the decoding
//! temperature differ.

use serde::{Deserialize, Serialize};

/// Default temperature for comment generation; low to keep the code literal.
pub const DEFAULT_ANNOTATE_TEMPERATURE: f32 = 0.2;

/// Default temperature for free-form explanations.
pub const DEFAULT_EXPLAIN_TEMPERATURE: f32 = 0.5;

const ANNOTATE_SYSTEM_PROMPT: &str = "You are a code documentation assistant. \
Your task is to add CLEAR, CONCISE inline comments to explain the code. Do NOT:\n\
1. Modify any existing code\n\
2. Add or remove any existing lines of code\n\
3. Add comments that state the obvious\n\
4. Change code formatting\n\
5. Wrap the result in markdown or write anything besides the commented code\n\
Format rules:\n\
- Use the comment syntax of {language}\n\
- Place comments ABOVE the relevant lines\n\
- Be professional and technical\n\
It is extremely important that you do not change, add or remove any code.";

const EXPLAIN_SYSTEM_PROMPT: &str = "You are a code analyst. Your task is to provide \
a very brief explanation of what the following code does. Focus on the main \
functionality and purpose of the code. Again, very brief.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptKind {
    /// Return the code unchanged with comments added above relevant lines.
    Annotate,
    /// Return a short prose explanation of the code.
    Explain,
}

/// A prompt template plus its decoding temperature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PromptEnvelope {
    pub kind: PromptKind,
    pub temperature: f32,
}

impl PromptEnvelope {
    pub fn annotate(temperature: f32) -> Self {
        Self {
            kind: PromptKind::Annotate,
            temperature,
        }
    }

    pub fn explain(temperature: f32) -> Self {
        Self {
            kind: PromptKind::Explain,
            temperature,
        }
    }

    pub fn system_prompt(&self, language: &str) -> String {
        match self.kind {
            PromptKind::Annotate => ANNOTATE_SYSTEM_PROMPT.replace("{language}", language),
            PromptKind::Explain => EXPLAIN_SYSTEM_PROMPT.to_string(),
        }
    }

    pub fn user_prompt(&self, language: &str, code: &str) -> String {
        match self.kind {
            PromptKind::Annotate => format!(
                "Add inline comments to this {} code without changing any code:\n\n{}",
                language, code
            ),
            PromptKind::Explain => format!("Explain what this {} code does:\n\n{}", language, code),
        }
    }
}

impl Default for PromptEnvelope {
    fn default() -> Self {
        Self::annotate(DEFAULT_ANNOTATE_TEMPERATURE)
    }
}
