//! Syntax model for visfix.
//!
//! Wraps a tree-sitter Rust parse tree together with the text it was parsed from. Values are
//! immutable: replacing a span returns a new [`SyntaxTree`], reparsed incrementally so that
//! subtrees outside the edit are reused.

mod error;
mod span;
mod tree;

pub use error::SyntaxError;
pub use span::{Position, Span};
pub use tree::{Preorder, SyntaxTree};

/// Re-exported so callers can inspect nodes without depending on tree-sitter directly.
pub use tree_sitter::Node;
