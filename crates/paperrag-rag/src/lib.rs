//! paperrag-rag
//!
//! Grounded answering over retrieved paper chunks and figures: context
//! assembly, answer synthesis, per-paper summaries and the request boundary
//! that turns every failure into a structured response.
use paperrag_core::error::Result;
use paperrag_core::traits::GenerativeModel;

pub mod answer;
pub mod context;
pub mod service;
pub mod summarize;

pub use answer::{Answer, AnswerSynthesizer};
pub use context::{ContextBlock, NO_CONTEXT};
pub use service::{AnswerRequest, AnswerResponse, ResearchService, SummarizeRequest, SummarizeResponse};
pub use summarize::PaperSummarizer;

/// One model call, resolved to plain text.
pub(crate) async fn generate_text(model: &dyn GenerativeModel, prompt: &str) -> Result<String> {
    model.generate(prompt).await?.into_text()
}
