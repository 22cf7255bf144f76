//! Error types for visfix-syntax.

use crate::span::Span;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    /// The Rust grammar could not be loaded into the parser.
    #[error("language error: {0}")]
    Language(String),

    /// tree-sitter returned no tree (only happens on cancellation or timeout inside the parser).
    #[error("parse failed")]
    ParseFailed,

    #[error("span {span} is out of bounds for text of length {len}")]
    SpanOutOfBounds { span: Span, len: usize },

    #[error("span {span} does not fall on a char boundary")]
    NotCharBoundary { span: Span },
}
