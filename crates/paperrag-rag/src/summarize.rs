use std::sync::Arc;

use tracing::{debug, info, warn};

use paperrag_core::error::{Error, Result};
use paperrag_core::traits::GenerativeModel;
use paperrag_core::types::{RetrievalMatch, RetrievalOptions, SummaryResult};
use paperrag_hybrid::MultimodalRetriever;

use crate::context::ContextBlock;
use crate::generate_text;

/// Most matches rendered into one summary prompt, whatever top_k was asked for.
pub const MAX_SUMMARY_SOURCES: usize = 15;

const SCOPED_TERMS: &str = "summary findings methodology results conclusions";
const BROAD_TERMS: &str = "research study experiment";

pub struct PaperSummarizer {
    retriever: Arc<MultimodalRetriever>,
    model: Arc<dyn GenerativeModel>,
}

impl PaperSummarizer {
    pub fn new(retriever: Arc<MultimodalRetriever>, model: Arc<dyn GenerativeModel>) -> Self {
        Self { retriever, model }
    }

    /// Summarize one paper.
    ///
    /// Matches are restricted to `paper_id`. When none survive, a broader
    /// unfiltered search is used instead and the result is flagged
    /// `best_effort`. Model failures are wrapped with the paper id.
    pub async fn summarize(&self, paper_id: &str, options: RetrievalOptions) -> Result<SummaryResult> {
        if paper_id.trim().is_empty() {
            return Err(Error::InvalidQuery("paper_id cannot be empty.".to_string()));
        }

        let scoped = self.retriever.retrieve(&format!("{} {}", paper_id, SCOPED_TERMS), options).await?;
        let retrieved = scoped.len();
        let mut sources: Vec<RetrievalMatch> =
            scoped.into_iter().filter(|m| m.paper_id().as_deref() == Some(paper_id)).collect();
        debug!(paper_id, retrieved, kept = sources.len(), "scoped search done");

        let best_effort = sources.is_empty();
        if best_effort {
            warn!(paper_id, "no matches for paper, falling back to broad search");
            sources = self.retriever.retrieve(&format!("{} {}", paper_id, BROAD_TERMS), options).await?;
        }
        sources.truncate(MAX_SUMMARY_SOURCES);

        let context = ContextBlock::assemble_with_descriptions(&sources);
        let summary = generate_text(self.model.as_ref(), &summary_prompt(paper_id, &context))
            .await
            .map_err(|e| Error::SummaryFailed { paper_id: paper_id.to_string(), source: Box::new(e) })?;

        info!(paper_id, sources_used = sources.len(), best_effort, "summary generated");
        Ok(SummaryResult { summary, sources_used: sources.len(), paper_id: paper_id.to_string(), best_effort })
    }
}

pub fn summary_prompt(paper_id: &str, context: &ContextBlock) -> String {
    format!(
        "You are a research assistant summarizing the scientific paper \"{paper_id}\". \
         Use only the content below.\n\n\
         Content:\n{context}\n\n\
         Write a summary with exactly these markdown sections, in this order:\n\
         ## 1. Main Research Question/Objective\n\
         ## 2. Methodology/Experimental Design\n\
         ## 3. Key Findings\n\
         ## 4. Conclusions and Implications\n\
         ## 5. Significance and Impact\n\n\
         If the content is insufficient for a section, say so explicitly in that section.\n"
    )
}
