use async_trait::async_trait;

use crate::error::Result;
use crate::response::ModelResponse;
use crate::types::{IndexMatch, QueryVector, VectorSpace};

/// Maps free text into one vector space. Deterministic for a given model.
///
/// Encoding is CPU-bound and synchronous; async callers should move it off
/// the runtime threads.
pub trait QueryEncoder<S: VectorSpace>: Send + Sync {
    fn dim(&self) -> usize;
    fn encode(&self, text: &str) -> Result<QueryVector<S>>;
}

/// Nearest-neighbour search over one vector index.
///
/// Results come back in the index's own order (score descending). `top_k`
/// must be positive. Implementations do not retry.
#[async_trait]
pub trait EmbeddingIndex<S: VectorSpace>: Send + Sync {
    fn name(&self) -> &str;
    async fn query(&self, vector: &QueryVector<S>, top_k: usize) -> Result<Vec<IndexMatch>>;
}

/// A text generation endpoint. One call, no streaming.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    fn model_id(&self) -> &str;
    async fn generate(&self, prompt: &str) -> Result<ModelResponse>;
}
