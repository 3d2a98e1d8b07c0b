use std::sync::Arc;

use tracing::{debug, info};

use paperrag_core::error::{Error, Result};
use paperrag_core::traits::GenerativeModel;
use paperrag_core::types::{RetrievalMatch, RetrievalOptions};
use paperrag_hybrid::MultimodalRetriever;

use crate::context::ContextBlock;
use crate::generate_text;

/// Model answer plus every ranked match it was grounded on.
#[derive(Debug, Clone)]
pub struct Answer {
    pub answer: String,
    pub matches: Vec<RetrievalMatch>,
}

pub struct AnswerSynthesizer {
    retriever: Arc<MultimodalRetriever>,
    model: Arc<dyn GenerativeModel>,
}

impl AnswerSynthesizer {
    pub fn new(retriever: Arc<MultimodalRetriever>, model: Arc<dyn GenerativeModel>) -> Self {
        Self { retriever, model }
    }

    pub async fn answer(&self, query: &str, options: RetrievalOptions) -> Result<Answer> {
        if query.trim().is_empty() {
            return Err(Error::InvalidQuery("Query cannot be empty.".to_string()));
        }
        let matches = self.retriever.retrieve(query, options).await?;
        let context = ContextBlock::assemble(&matches);
        debug!(matches = matches.len(), context_entries = context.len(), "context assembled");

        let answer = generate_text(self.model.as_ref(), &answer_prompt(&context, query)).await?;
        info!(model = self.model.model_id(), matches = matches.len(), "answer generated");
        Ok(Answer { answer, matches })
    }
}

pub fn answer_prompt(context: &ContextBlock, question: &str) -> String {
    format!(
        "You are a helpful research assistant. Use only the context below to answer the question. \
         If the context does not contain the answer, respond \"I don't know.\"\n\n\
         Context:\n{}\n\nQuestion: {}\n",
        context, question
    )
}
