use thiserror::Error;

/// Failure taxonomy shared by every stage of the pipeline.
///
/// Callers at the request boundary map each variant to a structured error
/// response; none of them is meant to take the process down.
#[derive(Debug, Error)]
pub enum Error {
    /// Empty or malformed caller input.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// An encoder or vector index failed. Transient from the caller's view.
    #[error("Retrieval backend error: {0}")]
    RetrievalBackend(String),

    /// The generative model call failed or returned an unrecognized shape.
    #[error("Synthesis error: {0}")]
    Synthesis(String),

    #[error("Summary for paper '{paper_id}' failed: {source}")]
    SummaryFailed {
        paper_id: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Stable label used in structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidQuery(_) => "invalid_query",
            Error::RetrievalBackend(_) => "retrieval_backend",
            Error::Synthesis(_) => "synthesis",
            Error::SummaryFailed { source, .. } => source.kind(),
            Error::InvalidConfig(_) => "config",
        }
    }

    pub fn backend(err: impl std::fmt::Display) -> Self {
        Error::RetrievalBackend(err.to_string())
    }

    pub fn synthesis(err: impl std::fmt::Display) -> Self {
        Error::Synthesis(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
