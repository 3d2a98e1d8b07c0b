//! Domain types used by encoders, index clients and the answer pipeline.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;

pub type MatchId = String;
pub type Metadata = serde_json::Map<String, Value>;

/// Indicates which index produced a result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Text,
    Image,
}

impl Modality {
    pub fn as_str(self) -> &'static str {
        match self {
            Modality::Text => "text",
            Modality::Image => "image",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A vector space owned by one embedding model and one index.
///
/// Vectors from different spaces are never compared, so every encoder and
/// index is typed by the space it lives in.
pub trait VectorSpace: Send + Sync + 'static {
    const MODALITY: Modality;
}

/// Space of the text-chunk index (sentence embeddings).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSpace;

/// Space of the image index, reached from text through a cross-modal encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSpace;

impl VectorSpace for TextSpace {
    const MODALITY: Modality = Modality::Text;
}

impl VectorSpace for ImageSpace {
    const MODALITY: Modality = Modality::Image;
}

/// A query embedding tagged with the space it was produced in.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryVector<S> {
    values: Vec<f32>,
    _space: PhantomData<S>,
}

impl<S: VectorSpace> QueryVector<S> {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values, _space: PhantomData }
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn dim(&self) -> usize {
        self.values.len()
    }
}

/// A hit exactly as an index returned it, before ranking.
///
/// `score` is in the index's native similarity metric and may be absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexMatch {
    pub id: MatchId,
    #[serde(default)]
    pub score: Option<f32>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl IndexMatch {
    /// Tag the hit with its source. Returns `None` when the index gave no
    /// score or a non-finite one, so such hits can never reach ranking.
    pub fn into_retrieval(self, source: Modality) -> Option<RetrievalMatch> {
        let score = self.score.filter(|s| s.is_finite())?;
        Some(RetrievalMatch { id: self.id, score, metadata: self.metadata, source })
    }
}

/// A ranked, source-tagged result. Lives for one request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalMatch {
    pub id: MatchId,
    pub score: f32,
    pub metadata: Metadata,
    pub source: Modality,
}

impl RetrievalMatch {
    /// The `paper_id` metadata field, rendered as text.
    pub fn paper_id(&self) -> Option<String> {
        meta_text(&self.metadata, "paper_id")
    }
}

/// Metadata view of a text-chunk match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkMetadata {
    pub paper_id: String,
    /// 1-based.
    pub page: Option<u32>,
    /// 0-based within the page.
    pub chunk_index: Option<u32>,
    pub text: String,
}

impl ChunkMetadata {
    pub fn from_metadata(meta: &Metadata) -> Self {
        Self {
            paper_id: meta_text(meta, "paper_id").unwrap_or_default(),
            page: meta_u32(meta, "page"),
            chunk_index: meta_u32(meta, "chunk_index"),
            text: meta_text(meta, "text").unwrap_or_default(),
        }
    }
}

/// Metadata view of an image match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageMetadata {
    pub paper_id: String,
    pub page: Option<u32>,
    pub image_index: Option<u32>,
    pub image_url: Option<String>,
    pub description: Option<String>,
}

impl ImageMetadata {
    pub fn from_metadata(meta: &Metadata) -> Self {
        Self {
            paper_id: meta_text(meta, "paper_id").unwrap_or_default(),
            page: meta_u32(meta, "page"),
            image_index: meta_u32(meta, "image_index"),
            image_url: meta_text(meta, "image_url"),
            description: meta_text(meta, "description"),
        }
    }
}

/// Reads a metadata field as display text. Empty strings and nulls count as
/// missing. Integral numbers drop their fractional part, since remote
/// indexes store every number as a float.
pub fn meta_text(meta: &Metadata, key: &str) -> Option<String> {
    match meta.get(key)? {
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        }),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

pub fn meta_u32(meta: &Metadata, key: &str) -> Option<u32> {
    match meta.get(key)? {
        Value::Number(n) => {
            let f = n.as_f64()?;
            (f >= 0.0 && f.fract() == 0.0 && f <= f64::from(u32::MAX)).then_some(f as u32)
        }
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Per-request retrieval overrides.
///
/// `None` falls back to the configured default; `Some(0)` skips that
/// modality entirely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalOptions {
    pub top_k_text: Option<usize>,
    pub top_k_image: Option<usize>,
}

impl RetrievalOptions {
    pub fn new(top_k_text: Option<usize>, top_k_image: Option<usize>) -> Self {
        Self { top_k_text, top_k_image }
    }

    /// Returns `(top_k_text, top_k_image)`.
    pub fn resolve(&self, defaults: &RetrievalDefaults) -> (usize, usize) {
        (
            self.top_k_text.unwrap_or(defaults.top_k_text),
            self.top_k_image.unwrap_or(defaults.top_k_image),
        )
    }
}

/// Process-wide defaults for result counts per modality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalDefaults {
    pub top_k_text: usize,
    pub top_k_image: usize,
}

impl Default for RetrievalDefaults {
    fn default() -> Self {
        Self { top_k_text: 5, top_k_image: 3 }
    }
}

/// Structured summary of one paper.
///
/// `best_effort` is set when the scoped search found nothing and the
/// summary was built from an unfiltered, broader search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummaryResult {
    pub summary: String,
    pub sources_used: usize,
    pub paper_id: String,
    #[serde(default)]
    pub best_effort: bool,
}
