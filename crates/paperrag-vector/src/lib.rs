//! paperrag-vector
//!
//! Embedding index clients. `PineconeIndex` talks to the hosted indexes the
//! corpus was ingested into; `LanceIndex` reads a local LanceDB table with
//! the same row layout for offline use.
use std::sync::Arc;

use paperrag_core::config::{IndexBackend, IndexSettings};
use paperrag_core::error::Result;
use paperrag_core::traits::EmbeddingIndex;
use paperrag_core::types::VectorSpace;

pub mod lance;
pub mod pinecone;
pub mod table;

pub use lance::LanceIndex;
pub use pinecone::PineconeIndex;

/// Build the index client selected by `settings.backend`.
pub async fn connect_index<S: VectorSpace>(settings: &IndexSettings) -> Result<Arc<dyn EmbeddingIndex<S>>> {
    match settings.backend {
        IndexBackend::Pinecone => Ok(Arc::new(PineconeIndex::<S>::connect(settings).await?)),
        IndexBackend::Lance => Ok(Arc::new(LanceIndex::<S>::open(settings).await?)),
    }
}
