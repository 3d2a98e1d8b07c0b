use candle_core::{Device, Tensor};
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use std::path::Path;
use std::time::Instant;
use tokenizers::Tokenizer;

use paperrag_core::error::{Error, Result};
use paperrag_core::traits::QueryEncoder;
use paperrag_core::types::{QueryVector, TextSpace};

use crate::pool::{l2_normalize, masked_mean};
use crate::tokenize::{load_tokenizer, tokenize_query};
use crate::weights::{load_weights, model_file};

pub const MINILM_DIM: usize = 384;
const MAX_LEN: usize = 256;

/// Sentence encoder for the text-chunk index (`all-MiniLM-L6-v2`).
///
/// Mean-pools the last hidden layer over real tokens and L2-normalises,
/// matching how the chunks were embedded at ingestion.
pub struct MiniLmEncoder { model: BertModel, tokenizer: Tokenizer, device: Device, dim: usize }

impl MiniLmEncoder {
    pub fn load(model_dir: &Path, device: Device) -> Result<Self> {
        tracing::info!(dir = %model_dir.display(), "loading MiniLM text encoder");
        let tokenizer = load_tokenizer(&model_file(model_dir, "tokenizer.json")?)?;
        let config_path = model_file(model_dir, "config.json")?;
        let raw = std::fs::read_to_string(&config_path).map_err(|e| Error::InvalidConfig(format!("{}: {}", config_path.display(), e)))?;
        let config: BertConfig = serde_json::from_str(&raw).map_err(|e| Error::InvalidConfig(format!("{}: {}", config_path.display(), e)))?;
        let vb = load_weights(model_dir, &device)?;
        let model = BertModel::load(vb, &config).map_err(Error::backend)?;
        tracing::info!(dim = MINILM_DIM, "MiniLM text encoder ready");
        Ok(Self { model, tokenizer, device, dim: MINILM_DIM })
    }

    fn forward(&self, input_ids: &Tensor, attention_mask: &Tensor) -> candle_core::Result<Vec<f32>> {
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = self.model.forward(input_ids, &token_type_ids, Some(attention_mask))?;
        let pooled = l2_normalize(&masked_mean(&hidden, attention_mask)?)?;
        pooled.to_device(&Device::Cpu)?.squeeze(0)?.to_vec1::<f32>()
    }
}

impl QueryEncoder<TextSpace> for MiniLmEncoder {
    fn dim(&self) -> usize { self.dim }

    fn encode(&self, text: &str) -> Result<QueryVector<TextSpace>> {
        let start = Instant::now();
        let (input_ids, attention_mask) = tokenize_query(&self.tokenizer, text, MAX_LEN, &self.device)?;
        let values = self.forward(&input_ids, &attention_mask).map_err(Error::backend)?;
        if values.len() != self.dim {
            return Err(Error::backend(format!("text encoder produced {} dims, expected {}", values.len(), self.dim)));
        }
        tracing::debug!(elapsed_ms = start.elapsed().as_millis() as u64, "encoded text query");
        Ok(QueryVector::new(values))
    }
}
