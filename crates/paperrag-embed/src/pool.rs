use candle_core::{DType, Result, Tensor, D};

/// Attention-masked mean over the token axis of `[B, T, H]` hidden states.
pub fn masked_mean(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    let mask = attention_mask.to_device(hidden.device())?.to_dtype(hidden.dtype())?;
    let mask_3d = mask.unsqueeze(2)?.broadcast_as(hidden.shape())?;
    let sum = (hidden * &mask_3d)?.sum(1)?;
    // all-padding rows would divide by zero
    let lengths = mask.sum_keepdim(1)?.maximum(1e-9f64)?;
    sum.broadcast_div(&lengths)
}

/// Row-wise L2 normalisation of `[B, H]` embeddings.
pub fn l2_normalize(emb: &Tensor) -> Result<Tensor> {
    let eps_val = match emb.dtype() { DType::F16 | DType::BF16 => 1e-6f64, _ => 1e-12f64 };
    let norm = emb.sqr()?.sum_keepdim(D::Minus1)?.sqrt()?.affine(1.0, eps_val)?;
    emb.broadcast_div(&norm)
}
