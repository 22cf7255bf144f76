use crate::error::RuleError;
use serde::{Deserialize, Serialize};
use visfix_types::document::Document;
use visfix_types::finding::{Finding, ItemKind, RuleId};

mod missing_visibility;

pub use missing_visibility::MissingVisibilityRule;

/// A pure function from a parsed document to the findings it contains.
pub trait Rule: Send + Sync {
    fn id(&self) -> RuleId;

    fn evaluate(&self, document: &Document) -> Result<Vec<Finding>, RuleError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Item kinds the visibility rule reports.
    pub kinds: Vec<ItemKind>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            kinds: ItemKind::DEFAULT.to_vec(),
        }
    }
}

pub fn builtin_rules(config: &RuleConfig) -> Vec<Box<dyn Rule>> {
    vec![Box::new(MissingVisibilityRule::new(
        config.kinds.iter().copied(),
    ))]
}
