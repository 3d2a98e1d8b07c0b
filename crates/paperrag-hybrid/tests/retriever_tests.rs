use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use paperrag_core::error::{Error, Result};
use paperrag_core::traits::EmbeddingIndex;
use paperrag_core::types::{
    ImageSpace, IndexMatch, Metadata, Modality, QueryVector, RetrievalDefaults, RetrievalOptions, TextSpace, VectorSpace,
};
use paperrag_embed::HashEncoder;
use paperrag_hybrid::{ModalityPipeline, MultimodalRetriever};
use serde_json::json;
use tokio::sync::Barrier;

/// Returns canned hits and records every call.
struct CannedIndex {
    hits: Vec<IndexMatch>,
    calls: AtomicUsize,
    last_top_k: AtomicUsize,
    barrier: Option<Arc<Barrier>>,
    fail: bool,
}

impl CannedIndex {
    fn new(hits: Vec<IndexMatch>) -> Self {
        Self { hits, calls: AtomicUsize::new(0), last_top_k: AtomicUsize::new(0), barrier: None, fail: false }
    }
}

#[async_trait]
impl<S: VectorSpace> EmbeddingIndex<S> for CannedIndex {
    fn name(&self) -> &str {
        "canned"
    }

    async fn query(&self, _vector: &QueryVector<S>, top_k: usize) -> Result<Vec<IndexMatch>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_top_k.store(top_k, Ordering::SeqCst);
        if let Some(b) = &self.barrier {
            b.wait().await;
        }
        if self.fail {
            return Err(Error::RetrievalBackend("index unavailable".into()));
        }
        Ok(self.hits.iter().take(top_k).cloned().collect())
    }
}

fn hit(id: &str, score: Option<f32>, paper: &str) -> IndexMatch {
    let mut metadata = Metadata::new();
    metadata.insert("paper_id".into(), json!(paper));
    IndexMatch { id: id.into(), score, metadata }
}

fn retriever(text: Arc<CannedIndex>, image: Arc<CannedIndex>) -> MultimodalRetriever {
    MultimodalRetriever::new(
        ModalityPipeline::new(Arc::new(HashEncoder::<TextSpace>::new(8)), text),
        ModalityPipeline::new(Arc::new(HashEncoder::<ImageSpace>::new(4)), image),
        RetrievalDefaults::default(),
    )
}

#[tokio::test]
async fn merges_both_modalities_sorted_and_drops_unscored() {
    let text = Arc::new(CannedIndex::new(vec![
        hit("t1", Some(0.82), "bio7"),
        hit("t2", None, "bio7"),
        hit("t3", Some(0.30), "geo1"),
    ]));
    let image = Arc::new(CannedIndex::new(vec![hit("i1", Some(0.55), "bio7"), hit("i2", Some(0.91), "geo1")]));
    let r = retriever(text, image);

    let out = r.retrieve("is there a paper on mice?", RetrievalOptions::default()).await.expect("retrieve");

    let ids: Vec<_> = out.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, ["i2", "t1", "i1", "t3"]);
    assert!(out.windows(2).all(|w| w[0].score >= w[1].score));
    assert_eq!(out[0].source, Modality::Image);
    assert_eq!(out[1].source, Modality::Text);
}

#[tokio::test]
async fn defaults_apply_only_when_absent_and_zero_skips() {
    let text = Arc::new(CannedIndex::new(vec![hit("t1", Some(0.5), "p")]));
    let image = Arc::new(CannedIndex::new(vec![hit("i1", Some(0.5), "p")]));
    let r = retriever(Arc::clone(&text), Arc::clone(&image));

    r.retrieve("q", RetrievalOptions::default()).await.expect("retrieve");
    assert_eq!(text.last_top_k.load(Ordering::SeqCst), 5);
    assert_eq!(image.last_top_k.load(Ordering::SeqCst), 3);

    let out = r.retrieve("q", RetrievalOptions::new(Some(2), Some(0))).await.expect("retrieve");
    assert_eq!(text.last_top_k.load(Ordering::SeqCst), 2);
    assert_eq!(image.calls.load(Ordering::SeqCst), 1, "image index not called for k=0");
    assert!(out.iter().all(|m| m.source == Modality::Text));
}

#[tokio::test]
async fn both_index_calls_are_in_flight_together() {
    let barrier = Arc::new(Barrier::new(2));
    let mut text = CannedIndex::new(vec![hit("t1", Some(0.5), "p")]);
    text.barrier = Some(Arc::clone(&barrier));
    let mut image = CannedIndex::new(vec![hit("i1", Some(0.4), "p")]);
    image.barrier = Some(barrier);
    let r = retriever(Arc::new(text), Arc::new(image));

    // A serial implementation would wait on the barrier forever.
    let out = tokio::time::timeout(Duration::from_secs(5), r.retrieve("q", RetrievalOptions::default()))
        .await
        .expect("queries were serialized")
        .expect("retrieve");
    assert_eq!(out.len(), 2);
}

#[tokio::test]
async fn failure_in_either_modality_fails_the_call() {
    let text = Arc::new(CannedIndex::new(vec![hit("t1", Some(0.5), "p")]));
    let mut image = CannedIndex::new(vec![]);
    image.fail = true;
    let r = retriever(text, Arc::new(image));

    let err = r.retrieve("q", RetrievalOptions::default()).await.expect_err("no partial success");
    assert!(matches!(err, Error::RetrievalBackend(_)));
}

#[tokio::test]
async fn duplicates_are_not_collapsed() {
    let text = Arc::new(CannedIndex::new(vec![hit("same", Some(0.7), "p")]));
    let image = Arc::new(CannedIndex::new(vec![hit("same", Some(0.7), "p")]));
    let out = retriever(text, image).retrieve("q", RetrievalOptions::default()).await.expect("retrieve");
    assert_eq!(out.len(), 2);
}

#[tokio::test]
async fn non_finite_scores_never_reach_ranking() {
    let text = Arc::new(CannedIndex::new(vec![hit("t1", Some(0.2), "p"), hit("nan", Some(f32::NAN), "p")]));
    let image = Arc::new(CannedIndex::new(vec![hit("i1", Some(0.7), "p")]));
    let out = retriever(text, image).retrieve("?!", RetrievalOptions::default()).await.expect("retrieve");
    let ids: Vec<_> = out.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, ["i1", "t1"]);
}
