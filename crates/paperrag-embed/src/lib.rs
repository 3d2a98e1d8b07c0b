//! paperrag-embed
//!
//! Query encoders for the two index spaces: a MiniLM sentence encoder for
//! text chunks and the CLIP text tower for figures. `HashEncoder` stands in
//! for both when `encoders.fake` (or `APP_USE_FAKE_EMBEDDINGS`) is set.
use std::sync::Arc;

use paperrag_core::config::EncoderSettings;
use paperrag_core::error::Result;
use paperrag_core::traits::QueryEncoder;
use paperrag_core::types::{ImageSpace, TextSpace};

pub mod clip;
pub mod device;
pub mod hash;
pub mod minilm;
pub mod pool;
pub mod tokenize;
pub mod weights;

pub use clip::{ClipTextEncoder, CLIP_DIM};
pub use device::select_device;
pub use hash::HashEncoder;
pub use minilm::{MiniLmEncoder, MINILM_DIM};

/// Process-wide encoder handles, built once at startup.
#[derive(Clone)]
pub struct Encoders {
    pub text: Arc<dyn QueryEncoder<TextSpace>>,
    pub image: Arc<dyn QueryEncoder<ImageSpace>>,
}

impl Encoders {
    pub fn load(settings: &EncoderSettings) -> Result<Self> {
        if settings.fake {
            tracing::info!("using hash encoders");
            return Ok(Self::fake());
        }
        let device = select_device();
        let text = MiniLmEncoder::load(&settings.text_model_path(), device.clone())?;
        let image = ClipTextEncoder::load(&settings.image_model_path(), device)?;
        Ok(Self { text: Arc::new(text), image: Arc::new(image) })
    }

    pub fn fake() -> Self {
        Self {
            text: Arc::new(HashEncoder::<TextSpace>::new(MINILM_DIM)),
            image: Arc::new(HashEncoder::<ImageSpace>::new(CLIP_DIM)),
        }
    }
}
