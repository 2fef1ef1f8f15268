// ============================================================
// Library Error Type
// ============================================================
// Errors raised by the vocabulary, embedding and persistence
// code. Unknown tokens are never errors; they fall back to
// sentinel ids instead.
//
// The application layer wraps these in anyhow::Error with
// extra context, the same way it treats I/O failures.

/// Errors from exploit-tagger operations.
#[derive(Debug, thiserror::Error)]
pub enum TaggerError {
    /// A tag id does not index into the fixed tag enumeration.
    #[error("tag id {id} out of range (vocabulary has {n_tags} tags)")]
    TagOutOfRange {
        /// The offending id.
        id: i64,
        /// Size of the tag enumeration.
        n_tags: usize,
    },

    /// A pretrained vector has the wrong length.
    #[error("embedding for '{token}' has {found} dims, expected {expected}")]
    EmbeddingDim {
        /// Token whose vector is malformed.
        token: String,
        /// Dimensionality declared by the source.
        expected: usize,
        /// Length actually found.
        found: usize,
    },

    /// A saved vocabulary state is internally inconsistent.
    #[error("invalid vocabulary state: {0}")]
    InvalidState(String),

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON (de)serialisation error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type for exploit-tagger operations.
pub type Result<T> = std::result::Result<T, TaggerError>;
