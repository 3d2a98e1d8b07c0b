//! paperrag-hybrid
//!
//! Runs the text and image encode→query pipelines side by side and merges
//! their hits into one ranked list.
use std::sync::Arc;

use tracing::{debug, warn};

use paperrag_core::error::{Error, Result};
use paperrag_core::traits::{EmbeddingIndex, QueryEncoder};
use paperrag_core::types::{ImageSpace, RetrievalDefaults, RetrievalMatch, RetrievalOptions, TextSpace, VectorSpace};

/// Encoder and index for one vector space.
pub struct ModalityPipeline<S: VectorSpace> {
    encoder: Arc<dyn QueryEncoder<S>>,
    index: Arc<dyn EmbeddingIndex<S>>,
}

impl<S: VectorSpace> Clone for ModalityPipeline<S> {
    fn clone(&self) -> Self {
        Self { encoder: Arc::clone(&self.encoder), index: Arc::clone(&self.index) }
    }
}

impl<S: VectorSpace> ModalityPipeline<S> {
    pub fn new(encoder: Arc<dyn QueryEncoder<S>>, index: Arc<dyn EmbeddingIndex<S>>) -> Self {
        Self { encoder, index }
    }

    /// Encode on the blocking pool, then query the index. `top_k == 0`
    /// returns nothing without touching either.
    pub async fn search(&self, query: &str, top_k: usize) -> Result<Vec<RetrievalMatch>> {
        if top_k == 0 {
            return Ok(Vec::new());
        }
        let encoder = Arc::clone(&self.encoder);
        let text = query.to_string();
        let vector = tokio::task::spawn_blocking(move || encoder.encode(&text))
            .await
            .map_err(|e| Error::backend(format!("{} encoder task failed: {}", S::MODALITY, e)))??;

        let hits = self.index.query(&vector, top_k).await?;
        let total = hits.len();
        let scored: Vec<RetrievalMatch> = hits.into_iter().filter_map(|h| h.into_retrieval(S::MODALITY)).collect();
        if scored.len() < total {
            warn!(index = self.index.name(), dropped = total - scored.len(), "dropping matches without a usable score");
        }
        debug!(modality = %S::MODALITY, top_k, hits = scored.len(), "modality search done");
        Ok(scored)
    }
}

/// Text + image retriever shared by every request.
#[derive(Clone)]
pub struct MultimodalRetriever {
    text: ModalityPipeline<TextSpace>,
    image: ModalityPipeline<ImageSpace>,
    defaults: RetrievalDefaults,
}

impl MultimodalRetriever {
    pub fn new(text: ModalityPipeline<TextSpace>, image: ModalityPipeline<ImageSpace>, defaults: RetrievalDefaults) -> Self {
        Self { text, image, defaults }
    }

    /// Both searches run concurrently; the first failure fails the call and
    /// drops the other search. Scores from the two indexes are sorted
    /// together as-is and duplicates are kept.
    pub async fn retrieve(&self, query: &str, options: RetrievalOptions) -> Result<Vec<RetrievalMatch>> {
        let (top_k_text, top_k_image) = options.resolve(&self.defaults);
        debug!(top_k_text, top_k_image, "retrieving");

        let (text_hits, image_hits) =
            tokio::try_join!(self.text.search(query, top_k_text), self.image.search(query, top_k_image))?;

        let mut merged = text_hits;
        merged.extend(image_hits);
        rank(&mut merged);
        Ok(merged)
    }
}

/// Sort by score, highest first. Stable, so equal scores keep text before image.
pub fn rank(matches: &mut [RetrievalMatch]) {
    matches.sort_by(|a, b| b.score.total_cmp(&a.score));
}
