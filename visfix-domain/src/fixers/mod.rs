use crate::error::FixError;
use serde::Serialize;
use visfix_types::document::Document;
use visfix_types::edit::{CandidateEdit, FixId};
use visfix_types::finding::{Finding, RuleId};

mod visibility;

pub use visibility::VisibilityFixer;

/// Turns one finding into one candidate edit with a fixed identity.
pub trait FixProposer: Send + Sync {
    fn fix_id(&self) -> FixId;

    fn rule(&self) -> RuleId {
        self.fix_id().rule()
    }

    /// `document` must be the unmodified document the finding was computed against.
    fn propose(&self, document: &Document, finding: &Finding) -> Result<CandidateEdit, FixError>;
}

pub fn builtin_proposers() -> Vec<Box<dyn FixProposer>> {
    FixId::ALL
        .iter()
        .map(|&fix| Box::new(VisibilityFixer::new(fix)) as Box<dyn FixProposer>)
        .collect()
}

/// Static description of a built-in fix, for listings.
#[derive(Debug, Clone, Serialize)]
pub struct FixerMeta {
    pub fix_id: FixId,
    pub rule: RuleId,
    pub rule_code: &'static str,
    pub title: &'static str,
    pub inserts: &'static str,
}

pub fn builtin_fixer_metas() -> Vec<FixerMeta> {
    FixId::ALL
        .iter()
        .map(|&fix| FixerMeta {
            fix_id: fix,
            rule: fix.rule(),
            rule_code: fix.rule().code(),
            title: fix.title(),
            inserts: fix.token(),
        })
        .collect()
}
