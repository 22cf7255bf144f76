//! Shared data model for the visfix workspace.
//!
//! # Design constraints
//! - Documents and projects are immutable values; editing produces new values.
//! - Identities (`RuleId`, `FixId`, `DocumentId`) are typed and compared structurally.
//! - Report types are serialized to disk; prefer adding optional fields over changing semantics.

pub mod cancel;
pub mod document;
pub mod edit;
pub mod finding;
pub mod report;

pub use visfix_syntax::{Position, Span, SyntaxTree};

/// Schema identifiers.
pub mod schema {
    pub const VISFIX_REPORT_V1: &str = "visfix.report.v1";
}
