use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;

use paperrag_core::error::{Error, Result};

/// Token ids and attention mask for a single query, shaped `[1, T]`.
///
/// Sequences longer than `max_len` are cut to `max_len` while keeping the
/// closing special token, so the model still sees a terminated sequence.
/// An empty query encodes to its special tokens only.
pub fn tokenize_query(tokenizer: &Tokenizer, text: &str, max_len: usize, device: &Device) -> Result<(Tensor, Tensor)> {
    let enc = tokenizer.encode(text, true).map_err(|e| Error::backend(format!("Tokenization failed: {}", e)))?;
    let mut ids = enc.get_ids().to_vec();
    let mut mask = enc.get_attention_mask().to_vec();
    if ids.is_empty() {
        return Err(Error::InvalidQuery("tokenizer produced no tokens".to_string()));
    }
    if ids.len() > max_len {
        let last = ids[ids.len() - 1];
        ids.truncate(max_len);
        mask.truncate(max_len);
        ids[max_len - 1] = last;
    }
    let input_ids = Tensor::new(ids.as_slice(), device).and_then(|t| t.unsqueeze(0)).map_err(Error::backend)?;
    let attention_mask = Tensor::new(mask.as_slice(), device).and_then(|t| t.unsqueeze(0)).map_err(Error::backend)?;
    Ok((input_ids, attention_mask))
}

/// Load `tokenizer.json` with its own truncation and padding switched off;
/// `tokenize_query` applies the encoder's length limit instead.
pub fn load_tokenizer(path: &std::path::Path) -> Result<Tokenizer> {
    let mut tokenizer = Tokenizer::from_file(path)
        .map_err(|e| Error::InvalidConfig(format!("Failed to load tokenizer from {}: {}", path.display(), e)))?;
    tokenizer
        .with_truncation(None)
        .map_err(|e| Error::InvalidConfig(format!("Failed to reset truncation for {}: {}", path.display(), e)))?;
    tokenizer.with_padding(None);
    Ok(tokenizer)
}
