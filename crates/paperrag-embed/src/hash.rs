use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use twox_hash::XxHash64;

use paperrag_core::error::Result;
use paperrag_core::traits::QueryEncoder;
use paperrag_core::types::{QueryVector, VectorSpace};

/// Deterministic bag-of-words encoder for development and tests.
///
/// Each lowercased word is hashed into one bucket; the result is
/// L2-normalised. Text without words encodes to the zero vector.
pub struct HashEncoder<S> { dim: usize, _space: PhantomData<S> }

impl<S: VectorSpace> HashEncoder<S> {
    pub fn new(dim: usize) -> Self { Self { dim, _space: PhantomData } }
}

impl<S: VectorSpace> QueryEncoder<S> for HashEncoder<S> {
    fn dim(&self) -> usize { self.dim }

    fn encode(&self, text: &str) -> Result<QueryVector<S>> {
        let mut v = vec![0f32; self.dim];
        if self.dim == 0 { return Ok(QueryVector::new(v)); }
        let words = text
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
            .filter(|w| !w.is_empty());
        for word in words {
            let mut hasher = XxHash64::with_seed(0);
            word.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            v[idx] += 0.5 + (((h >> 32) as u32) as f32) / (u32::MAX as f32);
        }
        let norm = (v.iter().map(|x| x * x).sum::<f32>()).sqrt();
        if norm > 0.0 { for x in &mut v { *x /= norm; } }
        Ok(QueryVector::new(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paperrag_core::types::{ImageSpace, TextSpace};

    #[test]
    fn deterministic_and_normalized() {
        let enc = HashEncoder::<TextSpace>::new(384);
        let a = enc.encode("Mice in microgravity").unwrap();
        let b = enc.encode("mice in MICROGRAVITY!").unwrap();
        assert_eq!(a, b);
        let norm: f32 = a.values().iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4, "norm={norm}");
    }

    #[test]
    fn empty_text_is_the_zero_vector() {
        let enc = HashEncoder::<ImageSpace>::new(512);
        let v = enc.encode("   ").unwrap();
        assert_eq!(v.dim(), 512);
        assert!(v.values().iter().all(|x| *x == 0.0));
    }
}
