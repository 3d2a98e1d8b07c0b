//! Generative model response shapes.
//!
//! A model either answers with a direct `text` field or with the structured
//! `candidates[].content.parts[]` layout. The shape is decided once, when the
//! body is decoded, and `into_text` is the only way to get the answer out.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ModelResponse {
    Text { text: String },
    Candidates { candidates: Vec<Candidate> },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<Part>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

impl ModelResponse {
    pub fn text(text: impl Into<String>) -> Self {
        ModelResponse::Text { text: text.into() }
    }

    /// Extract the answer text. The direct accessor wins; otherwise the first
    /// part of the first candidate is used.
    pub fn into_text(self) -> Result<String> {
        match self {
            ModelResponse::Text { text } => Ok(text),
            ModelResponse::Candidates { candidates } => {
                let first = candidates
                    .into_iter()
                    .next()
                    .ok_or_else(|| Error::Synthesis("model returned no candidates".to_string()))?;
                let reason = first.finish_reason.clone();
                first
                    .content
                    .and_then(|c| c.parts.into_iter().next())
                    .and_then(|p| p.text)
                    .ok_or_else(|| {
                        Error::Synthesis(format!(
                            "first candidate has no text part (finish reason: {})",
                            reason.as_deref().unwrap_or("unknown")
                        ))
                    })
            }
        }
    }
}
