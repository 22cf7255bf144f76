use crate::error::FixError;
use crate::fixers::FixProposer;
use crate::items::{has_visibility, item_at_keyword};
use visfix_syntax::Span;
use visfix_types::document::Document;
use visfix_types::edit::{CandidateEdit, FixId};
use visfix_types::finding::Finding;

/// Inserts a visibility token plus one space at the start of the item.
///
/// The item node starts after outer attributes, so the token lands before any
/// `unsafe`, `async` or `const` modifier.
#[derive(Debug, Clone, Copy)]
pub struct VisibilityFixer {
    fix: FixId,
}

impl VisibilityFixer {
    pub fn new(fix: FixId) -> Self {
        Self { fix }
    }
}

impl FixProposer for VisibilityFixer {
    fn fix_id(&self) -> FixId {
        self.fix
    }

    fn propose(&self, document: &Document, finding: &Finding) -> Result<CandidateEdit, FixError> {
        let not_found = || FixError::NodeNotFound {
            path: finding.path.clone(),
            span: finding.span,
        };
        if finding.document != document.id() {
            return Err(not_found());
        }

        let (item, kind) = item_at_keyword(document.tree(), finding.span).ok_or_else(not_found)?;
        if kind != finding.item || has_visibility(item) {
            return Err(not_found());
        }

        Ok(CandidateEdit::new(
            Span::empty(item.start_byte()),
            format!("{} ", self.fix.token()),
            self.fix,
            finding.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{MissingVisibilityRule, Rule};
    use visfix_types::finding::ItemKind;

    fn doc(text: &str) -> Document {
        Document::parse("demo", "src/lib.rs", text).expect("parse")
    }

    fn first_finding(d: &Document) -> Finding {
        MissingVisibilityRule::new(ItemKind::ALL.iter().copied())
            .evaluate(d)
            .expect("evaluate")
            .into_iter()
            .next()
            .expect("finding")
    }

    #[test]
    fn inserts_token_before_modifiers() {
        let text = "#[inline]\nunsafe fn poke() {}\n";
        let d = doc(text);
        let edit = VisibilityFixer::new(FixId::MakePubCrate)
            .propose(&d, &first_finding(&d))
            .expect("propose");
        assert_eq!(edit.span, Span::empty(10));
        assert_eq!(edit.replacement, "pub(crate) ");
        assert_eq!(edit.fix, FixId::MakePubCrate);
        assert_eq!(&text[10..16], "unsafe");
    }

    #[test]
    fn stale_span_is_node_not_found() {
        let d = doc("struct A;\n");
        let mut finding = first_finding(&d);
        finding.span = Span::new(7, 8);
        let err = VisibilityFixer::new(FixId::MakePub)
            .propose(&d, &finding)
            .unwrap_err();
        assert!(matches!(err, FixError::NodeNotFound { .. }));
    }

    #[test]
    fn already_visible_item_is_node_not_found() {
        let before = doc("struct A;\n");
        let finding = first_finding(&before);
        // Same path, so same document id, but the item has been fixed since.
        let after = doc("pub struct A;\n");
        let mut moved = finding.clone();
        moved.span = Span::new(4, 10);
        let err = VisibilityFixer::new(FixId::MakePub)
            .propose(&after, &moved)
            .unwrap_err();
        assert!(matches!(err, FixError::NodeNotFound { .. }));
    }
}
