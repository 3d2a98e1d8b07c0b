//! paperrag-llm
//!
//! Generative model clients. Only Gemini's `generateContent` endpoint is
//! supported; the prompt is sent as a single user turn.
pub mod gemini;

pub use gemini::GeminiClient;
