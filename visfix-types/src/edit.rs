use crate::document::DocumentId;
use crate::finding::{Finding, RuleId, UnknownId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use visfix_syntax::Span;

/// Fix identity (equivalence key): which resolution a candidate edit represents.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FixId {
    /// Insert `pub `.
    #[default]
    MakePub,
    /// Insert `pub(crate) `.
    MakePubCrate,
}

impl FixId {
    pub const ALL: &'static [FixId] = &[FixId::MakePub, FixId::MakePubCrate];

    pub fn as_str(self) -> &'static str {
        match self {
            FixId::MakePub => "make_pub",
            FixId::MakePubCrate => "make_pub_crate",
        }
    }

    /// The rule this fix resolves.
    pub fn rule(self) -> RuleId {
        match self {
            FixId::MakePub | FixId::MakePubCrate => RuleId::MissingVisibility,
        }
    }

    /// Visibility token inserted in front of the item.
    pub fn token(self) -> &'static str {
        match self {
            FixId::MakePub => "pub",
            FixId::MakePubCrate => "pub(crate)",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            FixId::MakePub => "Make item public",
            FixId::MakePubCrate => "Make item crate-visible",
        }
    }
}

impl fmt::Display for FixId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FixId {
    type Err = UnknownId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().replace('-', "_");
        FixId::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == norm)
            .ok_or_else(|| UnknownId {
                kind: "fix",
                value: s.to_string(),
            })
    }
}

const EDIT_NAMESPACE: Uuid = Uuid::from_bytes([
    0x3f, 0x9e, 0x0a, 0x6c, 0x21, 0x77, 0x4e, 0x90, 0x8b, 0x52, 0xd4, 0x0f, 0x6a, 0x13, 0xe8,
    0x45,
]);

/// A proposed, localized change that resolves one finding.
///
/// `span` is relative to the unmodified document the finding was computed against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateEdit {
    pub id: Uuid,
    pub document: DocumentId,
    pub span: Span,
    pub replacement: String,
    pub fix: FixId,
    pub finding: Finding,
}

impl CandidateEdit {
    pub fn new(span: Span, replacement: impl Into<String>, fix: FixId, finding: Finding) -> Self {
        let document = finding.document;
        Self {
            id: deterministic_edit_id(document, span, fix),
            document,
            span,
            replacement: replacement.into(),
            fix,
            finding,
        }
    }

    pub fn title(&self) -> &'static str {
        self.fix.title()
    }
}

fn deterministic_edit_id(document: DocumentId, span: Span, fix: FixId) -> Uuid {
    let key = format!("{}|{}|{}", document, span, fix);
    Uuid::new_v5(&EDIT_NAMESPACE, key.as_bytes())
}

/// The edits accepted for one application pass, grouped by document.
///
/// Every edit's fix identity equals the batch's target; [`FixBatch::accept`] enforces it.
/// Documents without edits are absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixBatch {
    rule: RuleId,
    fix: FixId,
    edits: BTreeMap<DocumentId, Vec<CandidateEdit>>,
}

impl FixBatch {
    pub fn new(rule: RuleId, fix: FixId) -> Self {
        Self {
            rule,
            fix,
            edits: BTreeMap::new(),
        }
    }

    pub fn rule(&self) -> RuleId {
        self.rule
    }

    pub fn fix(&self) -> FixId {
        self.fix
    }

    /// Add `edit` if it carries this batch's fix identity. Returns whether it was kept.
    pub fn accept(&mut self, edit: CandidateEdit) -> bool {
        if edit.fix != self.fix {
            return false;
        }
        self.edits.entry(edit.document).or_default().push(edit);
        true
    }

    /// Edits for `document`; empty when the document is absent.
    pub fn edits_for(&self, document: DocumentId) -> &[CandidateEdit] {
        self.edits.get(&document).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn documents(&self) -> impl Iterator<Item = DocumentId> + '_ {
        self.edits.keys().copied()
    }

    pub fn document_count(&self) -> usize {
        self.edits.len()
    }

    /// Total number of edits across all documents.
    pub fn len(&self) -> usize {
        self.edits.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::ItemKind;
    use camino::Utf8Path;
    use visfix_syntax::Position;

    fn finding(path: &str, start: usize) -> Finding {
        Finding {
            rule: RuleId::MissingVisibility,
            document: DocumentId::for_path("demo", Utf8Path::new(path)),
            path: path.into(),
            span: Span::new(start, start + 6),
            position: Position { line: 1, column: 1 },
            item: ItemKind::Struct,
            name: None,
        }
    }

    #[test]
    fn fix_id_parses_with_dashes_or_underscores() {
        assert_eq!("make_pub".parse::<FixId>(), Ok(FixId::MakePub));
        assert_eq!("make-pub-crate".parse::<FixId>(), Ok(FixId::MakePubCrate));
        assert!("make_private".parse::<FixId>().is_err());
    }

    #[test]
    fn every_fix_resolves_the_visibility_rule() {
        for fix in FixId::ALL {
            assert_eq!(fix.rule(), RuleId::MissingVisibility);
        }
    }

    #[test]
    fn edit_id_is_deterministic() {
        let a = CandidateEdit::new(Span::empty(0), "pub ", FixId::MakePub, finding("a.rs", 0));
        let b = CandidateEdit::new(Span::empty(0), "pub ", FixId::MakePub, finding("a.rs", 0));
        let c = CandidateEdit::new(
            Span::empty(0),
            "pub(crate) ",
            FixId::MakePubCrate,
            finding("a.rs", 0),
        );
        assert_eq!(a.id, b.id);
        assert_ne!(a.id, c.id);
    }

    #[test]
    fn batch_rejects_other_fix_identities() {
        let mut batch = FixBatch::new(RuleId::MissingVisibility, FixId::MakePub);
        let kept = batch.accept(CandidateEdit::new(
            Span::empty(0),
            "pub ",
            FixId::MakePub,
            finding("a.rs", 0),
        ));
        let dropped = batch.accept(CandidateEdit::new(
            Span::empty(10),
            "pub(crate) ",
            FixId::MakePubCrate,
            finding("a.rs", 10),
        ));
        assert!(kept);
        assert!(!dropped);
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.document_count(), 1);
    }

    #[test]
    fn absent_document_has_no_edits() {
        let batch = FixBatch::new(RuleId::MissingVisibility, FixId::MakePub);
        let id = DocumentId::for_path("demo", Utf8Path::new("missing.rs"));
        assert!(batch.edits_for(id).is_empty());
        assert!(batch.is_empty());
    }
}
