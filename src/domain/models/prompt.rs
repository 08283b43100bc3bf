use serde::{Deserialize, Serialize};

pub const DEFAULT_INSTRUCTION: &str = "I am a medical professional seeking information \
for educational purposes. Please provide a concise response to the following medical question: ";

/// How the user's text is flattened into the single prompt string sent upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptStyle {
    /// The instruction is prepended verbatim to the user text.
    Instructed(String),
    Bare,
}

impl PromptStyle {
    pub fn compose(&self, user_text: &str) -> String {
        match self {
            PromptStyle::Instructed(instruction) => format!("{instruction}{user_text}"),
            PromptStyle::Bare => user_text.to_string(),
        }
    }
}

impl Default for PromptStyle {
    fn default() -> Self {
        PromptStyle::Instructed(DEFAULT_INSTRUCTION.to_string())
    }
}
