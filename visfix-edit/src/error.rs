//! Error types for visfix-edit.
//!
//! Every variant is scoped to a single document: the applier records it as a failure for that
//! document and leaves the document unchanged.

use thiserror::Error;
use visfix_syntax::{Position, Span, SyntaxError};
use visfix_types::report::FailureKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    /// Two edits touch the same bytes, or insert at the same offset.
    #[error("edits at {first} and {second} overlap")]
    OverlappingEdits { first: Span, second: Span },

    /// The document parsed cleanly before the batch and has syntax errors after it.
    #[error("edited document no longer parses")]
    SyntaxBroken { position: Option<Position> },

    /// An edit span does not fit the document it was computed against.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

impl ApplyError {
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            ApplyError::OverlappingEdits { .. } => FailureKind::OverlappingEdits,
            ApplyError::SyntaxBroken { .. } => FailureKind::SyntaxBroken,
            ApplyError::Syntax(_) => FailureKind::NodeNotFound,
        }
    }

    pub fn position(&self) -> Option<Position> {
        match self {
            ApplyError::SyntaxBroken { position } => *position,
            _ => None,
        }
    }
}
