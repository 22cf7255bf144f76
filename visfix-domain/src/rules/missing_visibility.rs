use crate::error::RuleError;
use crate::items::{has_visibility, is_module_scope, item_name, keyword_span};
use crate::rules::Rule;
use std::collections::BTreeSet;
use visfix_syntax::Node;
use visfix_types::document::Document;
use visfix_types::finding::{Finding, ItemKind, RuleId};

/// Flags module-scope items declared without `pub`, `pub(crate)` or any other visibility.
#[derive(Debug, Clone)]
pub struct MissingVisibilityRule {
    kinds: BTreeSet<ItemKind>,
}

impl MissingVisibilityRule {
    pub fn new(kinds: impl IntoIterator<Item = ItemKind>) -> Self {
        Self {
            kinds: kinds.into_iter().collect(),
        }
    }

    pub fn kinds(&self) -> impl Iterator<Item = ItemKind> + '_ {
        self.kinds.iter().copied()
    }

    /// Lazily walks the tree in document order, yielding one finding per offending item.
    ///
    /// Does not check for syntax errors; [`Rule::evaluate`] does.
    pub fn findings<'d>(&'d self, document: &'d Document) -> impl Iterator<Item = Finding> + 'd {
        document
            .tree()
            .preorder()
            .filter_map(move |node| self.check(document, node))
    }

    fn check(&self, document: &Document, node: Node<'_>) -> Option<Finding> {
        let kind = ItemKind::from_node_kind(node.kind())?;
        if !self.kinds.contains(&kind) || has_visibility(node) || !is_module_scope(node) {
            return None;
        }
        let span = keyword_span(node, kind)?;
        let tree = document.tree();
        Some(Finding {
            rule: RuleId::MissingVisibility,
            document: document.id(),
            path: document.path().to_path_buf(),
            span,
            position: tree.position(span.start),
            item: kind,
            name: item_name(tree, node),
        })
    }
}

impl Default for MissingVisibilityRule {
    fn default() -> Self {
        Self::new(ItemKind::DEFAULT.iter().copied())
    }
}

impl Rule for MissingVisibilityRule {
    fn id(&self) -> RuleId {
        RuleId::MissingVisibility
    }

    fn evaluate(&self, document: &Document) -> Result<Vec<Finding>, RuleError> {
        if let Some(position) = document.tree().first_error() {
            return Err(RuleError::MalformedTree {
                path: document.path().to_path_buf(),
                position,
            });
        }
        Ok(self.findings(document).collect())
    }
}
