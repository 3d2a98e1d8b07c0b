use std::fmt;

use paperrag_core::types::{meta_text, ChunkMetadata, ImageMetadata, Modality, RetrievalMatch};

/// Sent to the model in place of an empty context.
pub const NO_CONTEXT: &str = "No context found.";

/// Rendered context for one prompt, one entry per usable match, in the
/// order the matches were given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextBlock {
    entries: Vec<String>,
}

impl ContextBlock {
    /// Context for question answering. Figures render by URL only.
    pub fn assemble(matches: &[RetrievalMatch]) -> Self {
        Self::build(matches, false)
    }

    /// Context for summaries. Figures carry their description when present.
    pub fn assemble_with_descriptions(matches: &[RetrievalMatch]) -> Self {
        Self::build(matches, true)
    }

    fn build(matches: &[RetrievalMatch], describe_images: bool) -> Self {
        let entries = matches
            .iter()
            .filter_map(|m| match m.source {
                Modality::Text => Some(render_chunk(m)),
                Modality::Image => render_image(m, describe_images),
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for ContextBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            f.write_str(NO_CONTEXT)
        } else {
            f.write_str(&self.entries.join("\n\n"))
        }
    }
}

fn render_chunk(m: &RetrievalMatch) -> String {
    let chunk = ChunkMetadata::from_metadata(&m.metadata);
    // page/chunk_index fall back to the raw value when it is not a whole number
    let page = chunk.page.map(|p| p.to_string()).or_else(|| meta_text(&m.metadata, "page")).unwrap_or_default();
    let index = chunk
        .chunk_index
        .map(|c| c.to_string())
        .or_else(|| meta_text(&m.metadata, "chunk_index"))
        .unwrap_or_default();
    format!("Source: {}, page {}, chunk {}\n{}", chunk.paper_id, page, index, chunk.text)
}

fn render_image(m: &RetrievalMatch, describe: bool) -> Option<String> {
    let image = ImageMetadata::from_metadata(&m.metadata);
    match (image.image_url, image.description) {
        (Some(url), Some(desc)) if describe => Some(format!("[Image Reference: {} - {}]", url, desc)),
        (Some(url), _) => Some(format!("[Image Reference: {}]", url)),
        (None, Some(desc)) => Some(format!("[Image Reference:  - {}]", desc)),
        (None, None) => None,
    }
}
