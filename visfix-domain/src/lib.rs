//! Domain logic: find rule violations and turn them into a batch of candidate edits.
//!
//! This crate owns *what* should be fixed and why. It does not own *how* edits are applied;
//! that's the `visfix-edit` crate.

mod collector;
mod error;
mod fixers;
mod items;
mod rules;

pub use collector::{BatchCollector, Collection};
pub use error::{CollectError, FixError, RuleError};
pub use fixers::{FixProposer, FixerMeta, VisibilityFixer, builtin_fixer_metas, builtin_proposers};
pub use rules::{MissingVisibilityRule, Rule, RuleConfig, builtin_rules};
