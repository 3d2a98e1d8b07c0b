use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use paperrag_core::error::{Error, Result};

/// Locate a file inside a model directory, failing with a config error.
pub fn model_file(dir: &Path, name: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    if path.exists() { Ok(path) } else { Err(Error::InvalidConfig(format!("missing {} in model dir {}", name, dir.display()))) }
}

/// Load weights from `model.safetensors`, or `pytorch_model.bin` as a fallback.
pub fn load_weights(dir: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    let safetensors = dir.join("model.safetensors");
    let weights: HashMap<String, Tensor> = if safetensors.exists() {
        tracing::debug!(path = %safetensors.display(), "loading safetensors weights");
        candle_core::safetensors::load(&safetensors, device).map_err(Error::backend)?
    } else {
        let pickle = model_file(dir, "pytorch_model.bin")?;
        tracing::debug!(path = %pickle.display(), "loading pickled weights");
        candle_core::pickle::read_all(&pickle).map_err(Error::backend)?.into_iter().collect()
    };
    Ok(VarBuilder::from_tensors(weights, DType::F32, device))
}
