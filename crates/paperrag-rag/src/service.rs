//! Request boundary. Every pipeline error is logged and returned as a
//! structured response; nothing here fails.
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::error;

use paperrag_core::error::Error;
use paperrag_core::traits::GenerativeModel;
use paperrag_core::types::{RetrievalMatch, RetrievalOptions};
use paperrag_hybrid::MultimodalRetriever;

use crate::answer::AnswerSynthesizer;
use crate::summarize::PaperSummarizer;

/// Matches returned to the caller with an answer.
pub const ANSWER_MATCH_LIMIT: usize = 5;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnswerRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub top_k_text: Option<usize>,
    #[serde(default)]
    pub top_k_img: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerResponse {
    Success { query: String, answer: String, matches: Vec<RetrievalMatch> },
    Error { error: String, query: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummarizeRequest {
    #[serde(default)]
    pub paper_id: String,
    #[serde(default)]
    pub top_k_text: Option<usize>,
    #[serde(default)]
    pub top_k_img: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SummarizeResponse {
    Success {
        paper_id: String,
        summary: String,
        sources_used: usize,
        status: Status,
        /// Present only when the summary came from the unfiltered fallback search.
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        best_effort: bool,
    },
    Error { error: String, paper_id: String, status: Status },
}

impl SummarizeResponse {
    pub fn status(&self) -> Status {
        match self {
            SummarizeResponse::Success { status, .. } | SummarizeResponse::Error { status, .. } => *status,
        }
    }
}

/// Process-wide entry point, constructed once and shared.
pub struct ResearchService {
    answers: AnswerSynthesizer,
    summaries: PaperSummarizer,
}

impl ResearchService {
    pub fn new(retriever: Arc<MultimodalRetriever>, model: Arc<dyn GenerativeModel>) -> Self {
        Self {
            answers: AnswerSynthesizer::new(Arc::clone(&retriever), Arc::clone(&model)),
            summaries: PaperSummarizer::new(retriever, model),
        }
    }

    pub async fn answer(&self, request: AnswerRequest) -> AnswerResponse {
        let options = RetrievalOptions::new(request.top_k_text, request.top_k_img);
        match self.answers.answer(&request.query, options).await {
            Ok(mut answer) => {
                answer.matches.truncate(ANSWER_MATCH_LIMIT);
                AnswerResponse::Success { query: request.query, answer: answer.answer, matches: answer.matches }
            }
            Err(e) => {
                error!(kind = e.kind(), error = %e, "answer failed");
                AnswerResponse::Error { error: response_message(&e), query: request.query }
            }
        }
    }

    pub async fn summarize(&self, request: SummarizeRequest) -> SummarizeResponse {
        let options = RetrievalOptions::new(request.top_k_text, request.top_k_img);
        match self.summaries.summarize(&request.paper_id, options).await {
            Ok(result) => SummarizeResponse::Success {
                paper_id: result.paper_id,
                summary: result.summary,
                sources_used: result.sources_used,
                status: Status::Success,
                best_effort: result.best_effort,
            },
            Err(e) => {
                error!(kind = e.kind(), paper_id = %request.paper_id, error = %e, "summary failed");
                SummarizeResponse::Error { error: response_message(&e), paper_id: request.paper_id, status: Status::Error }
            }
        }
    }
}

/// Caller input errors are reported verbatim; everything else keeps its category prefix.
fn response_message(e: &Error) -> String {
    match e {
        Error::InvalidQuery(msg) => msg.clone(),
        other => other.to_string(),
    }
}
