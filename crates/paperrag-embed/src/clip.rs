use candle_core::{Device, Tensor};
use candle_transformers::models::clip::{ClipConfig, ClipModel};
use std::path::Path;
use tokenizers::Tokenizer;

use paperrag_core::error::{Error, Result};
use paperrag_core::traits::QueryEncoder;
use paperrag_core::types::{ImageSpace, QueryVector};

use crate::tokenize::{load_tokenizer, tokenize_query};
use crate::weights::{load_weights, model_file};

pub const CLIP_DIM: usize = 512;
/// CLIP's text tower has 77 position embeddings.
const MAX_LEN: usize = 77;

/// Cross-modal encoder: maps a text query into the `clip-ViT-B-32` space the
/// figure index was built in. Output is the projected text embedding.
pub struct ClipTextEncoder { model: ClipModel, tokenizer: Tokenizer, device: Device }

impl ClipTextEncoder {
    pub fn load(model_dir: &Path, device: Device) -> Result<Self> {
        tracing::info!(dir = %model_dir.display(), "loading CLIP text encoder");
        let tokenizer = load_tokenizer(&model_file(model_dir, "tokenizer.json")?)?;
        let vb = load_weights(model_dir, &device)?;
        let model = ClipModel::new(vb, &ClipConfig::vit_base_patch32()).map_err(Error::backend)?;
        tracing::info!(dim = CLIP_DIM, "CLIP text encoder ready");
        Ok(Self { model, tokenizer, device })
    }

    fn forward(&self, input_ids: &Tensor) -> candle_core::Result<Vec<f32>> {
        let features = self.model.get_text_features(input_ids)?;
        features.to_device(&Device::Cpu)?.squeeze(0)?.to_vec1::<f32>()
    }
}

impl QueryEncoder<ImageSpace> for ClipTextEncoder {
    fn dim(&self) -> usize { CLIP_DIM }

    fn encode(&self, text: &str) -> Result<QueryVector<ImageSpace>> {
        let (input_ids, _mask) = tokenize_query(&self.tokenizer, text, MAX_LEN, &self.device)?;
        let values = self.forward(&input_ids).map_err(Error::backend)?;
        if values.len() != CLIP_DIM {
            return Err(Error::backend(format!("image encoder produced {} dims, expected {}", values.len(), CLIP_DIM)));
        }
        Ok(QueryVector::new(values))
    }
}
