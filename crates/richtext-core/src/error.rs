use crate::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Errors produced by document queries and mutations.
pub enum CoreError {
    #[error("no node at path {0}")]
    /// The path does not address a node.
    InvalidPath(Path),

    #[error("offset {offset} is out of bounds for the text at {path}")]
    /// A character offset lies outside its text node.
    InvalidOffset {
        /// Path of the text node.
        path: Path,
        /// Offending offset (chars).
        offset: usize,
    },

    #[error("node at {0} is not a text span")]
    /// A text operation addressed an element.
    NotText(Path),

    #[error("node at {0} is not an element")]
    /// An element operation addressed a text span.
    NotElement(Path),

    #[error("normalization did not settle after {0} iterations")]
    /// Normalizers kept producing operations past the iteration budget.
    NormalizationLoop(usize),
}
