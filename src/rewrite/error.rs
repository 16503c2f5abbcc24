//! Errors raised while rewriting a single file.

use thiserror::Error;

use super::splice::EditConflict;
use crate::syntax::SyntaxError;

/// A per-file failure. The file's text is never partially modified.
#[derive(Error, Debug)]
pub enum RewriteError {
    #[error("{file}: conflicting edits: {source}")]
    Conflict {
        file: String,
        #[source]
        source: EditConflict,
    },

    #[error("{file}: ambiguous use of marker `{marker}`: {reason}")]
    AmbiguousMarker {
        file: String,
        marker: String,
        reason: String,
    },

    #[error("{file}: syntax check failed: {source}")]
    Syntax {
        file: String,
        #[source]
        source: SyntaxError,
    },

    #[error("{file}: rewritten output no longer parses")]
    SyntaxRegression { file: String },
}

impl RewriteError {
    /// The file the error belongs to.
    pub fn file(&self) -> &str {
        match self {
            RewriteError::Conflict { file, .. }
            | RewriteError::AmbiguousMarker { file, .. }
            | RewriteError::Syntax { file, .. }
            | RewriteError::SyntaxRegression { file } => file,
        }
    }
}
