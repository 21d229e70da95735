//! Error taxonomy for a triage run.

/// Errors that abort a run (or, for classification, the render step).
///
/// Line-level parse problems are not errors; see
/// [`crate::sources::ParseOutcome`].
#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    #[error("gave up fetching {url} after {attempts} attempt(s): {last_error}")]
    FetchExhausted {
        url: String,
        attempts: u32,
        last_error: String,
    },

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("undecodable {source_name} payload: {reason}")]
    Payload { source_name: String, reason: String },

    #[error("inconsistent classification for {path}: results {results:?} match no known tag")]
    InconsistentClassification {
        path: String,
        results: Option<String>,
    },

    #[error("template placeholder left unfilled: {placeholder}")]
    Template { placeholder: String },

    #[error("render error: {0}")]
    Render(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for triage operations.
pub type Result<T> = std::result::Result<T, TriageError>;
