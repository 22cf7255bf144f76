//! Error types for visfix-domain.
//!
//! Rule and fix errors are document-scoped: the collector turns them into report failures and
//! keeps going. `CollectError` is for mistakes made by the caller, detected before any document
//! is visited, and for cancellation.

use camino::Utf8PathBuf;
use thiserror::Error;
use visfix_types::cancel::Cancelled;
use visfix_types::edit::FixId;
use visfix_types::finding::RuleId;
use visfix_types::{Position, Span};

/// The rule could not evaluate a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("cannot evaluate {path}: syntax error at {position}")]
    MalformedTree {
        path: Utf8PathBuf,
        position: Position,
    },
}

impl RuleError {
    pub fn position(&self) -> Option<Position> {
        match self {
            RuleError::MalformedTree { position, .. } => Some(*position),
        }
    }
}

/// A fix proposer could not produce an edit for a finding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FixError {
    /// The finding's span no longer resolves to an item that still lacks a visibility modifier.
    #[error("no fixable item at {span} in {path}")]
    NodeNotFound { path: Utf8PathBuf, span: Span },
}

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("rule `{0}` is not registered")]
    UnknownRule(RuleId),

    #[error("fix `{fix}` does not resolve rule `{rule}`")]
    FixRuleMismatch { fix: FixId, rule: RuleId },

    #[error("no proposer produces fix `{0}`")]
    NoProposer(FixId),

    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}
