//! Edit engine for visfix.
//!
//! Responsibilities:
//! - Check each document's candidate edits for overlaps before touching it.
//! - Apply a whole batch in one pass, reparsing incrementally after each edit.
//! - Produce new projects that share every untouched document with the old ones.
//! - Fingerprint changed documents and render a unified diff preview.

mod error;

pub use error::ApplyError;

use camino::Utf8PathBuf;
use diffy::PatchFormatter;
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use tracing::{debug, warn};
use visfix_types::cancel::{CancelToken, Cancelled};
use visfix_types::document::{Document, DocumentId, Project};
use visfix_types::edit::{CandidateEdit, FixBatch};
use visfix_types::report::{DocumentChange, Failure};

/// Result of applying a batch to one project.
#[derive(Debug, Clone)]
pub struct Applied {
    /// The input project with edited documents swapped in.
    pub project: Project,
    /// One entry per document whose text changed, in path order.
    pub changes: Vec<DocumentChange>,
    pub failures: Vec<Failure>,
}

/// Apply every edit in `batch` that targets a document of `project`.
///
/// A document either receives all of its edits or none of them. Documents without edits, and
/// documents whose edits fail, are carried over unchanged (same `Arc`). Cancellation is checked
/// between documents; a cancelled pass yields no project at all.
pub fn apply_batch(
    project: &Project,
    batch: &FixBatch,
    cancel: &CancelToken,
) -> Result<Applied, Cancelled> {
    let targets: Vec<(&Document, &[CandidateEdit])> = project
        .documents()
        .iter()
        .map(|doc| (doc.as_ref(), batch.edits_for(doc.id())))
        .filter(|(_, edits)| !edits.is_empty())
        .collect();

    let foreign = batch
        .documents()
        .filter(|id| project.document(*id).is_none())
        .count();
    if foreign > 0 {
        debug!(project = project.name(), foreign, "batch names documents outside this project");
    }

    let outcomes = targets
        .par_iter()
        .map(|(doc, edits)| {
            cancel.check()?;
            Ok((*doc, edits.len(), apply_document(doc, edits)))
        })
        .collect::<Result<Vec<_>, Cancelled>>()?;

    let mut replacements = BTreeMap::<DocumentId, Document>::new();
    let mut changes = Vec::new();
    let mut failures = Vec::new();
    for (doc, edit_count, outcome) in outcomes {
        match outcome {
            Ok(edited) => {
                if edited.text() != doc.text() {
                    changes.push(DocumentChange {
                        path: doc.path().to_string(),
                        edits: edit_count as u64,
                        sha256_before: sha256_hex(doc.text().as_bytes()),
                        sha256_after: sha256_hex(edited.text().as_bytes()),
                    });
                    replacements.insert(doc.id(), edited);
                }
            }
            Err(err) => {
                warn!(project = project.name(), path = %doc.path(), error = %err, "document left unchanged");
                let position = err.position();
                failures.push(Failure {
                    project: project.name().to_string(),
                    path: doc.path().to_string(),
                    kind: err.failure_kind(),
                    message: err.to_string(),
                    line: position.map(|p| p.line),
                    column: position.map(|p| p.column),
                });
            }
        }
    }

    debug!(
        project = project.name(),
        changed = changes.len(),
        failed = failures.len(),
        "applied batch"
    );
    Ok(Applied {
        project: project.with_replaced(replacements),
        changes,
        failures,
    })
}

/// Apply `edits` to one document, all or nothing.
///
/// Spans are relative to `document`. Edits are applied from the end of the text backwards so
/// that no earlier span is shifted by a later insertion.
pub fn apply_document(document: &Document, edits: &[CandidateEdit]) -> Result<Document, ApplyError> {
    let mut ordered: Vec<&CandidateEdit> = edits.iter().collect();
    ordered.sort_by(|a, b| {
        b.span
            .start
            .cmp(&a.span.start)
            .then_with(|| b.span.end.cmp(&a.span.end))
    });

    // Sorted by start, any overlap shows up between neighbours.
    for pair in ordered.windows(2) {
        let (later, earlier) = (pair[0], pair[1]);
        if later.span.overlaps(&earlier.span) {
            return Err(ApplyError::OverlappingEdits {
                first: earlier.span,
                second: later.span,
            });
        }
    }

    let was_clean = !document.tree().has_errors();
    let mut tree = document.tree().clone();
    for edit in &ordered {
        tree = tree.replace_span(edit.span, &edit.replacement)?;
    }
    if was_clean && tree.has_errors() {
        return Err(ApplyError::SyntaxBroken {
            position: tree.first_error(),
        });
    }
    Ok(document.with_tree(tree))
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Unified diff over every path whose text differs between `before` and `after`.
pub fn render_patch(
    before: &BTreeMap<Utf8PathBuf, String>,
    after: &BTreeMap<Utf8PathBuf, String>,
) -> String {
    let mut out = String::new();
    let formatter = PatchFormatter::new();

    for (path, old) in before {
        let new = after.get(path).unwrap_or(old);
        if old == new {
            continue;
        }

        out.push_str(&format!("diff --git a/{0} b/{0}\n", path));
        out.push_str(&format!("--- a/{0}\n+++ b/{0}\n", path));

        let patch = diffy::create_patch(old, new);
        let body = formatter.fmt_patch(&patch).to_string();
        // diffy's own header names the sides "original" and "modified"; keep only the hunks.
        for line in body.lines().skip_while(|l| !l.starts_with("@@")) {
            out.push_str(line);
            out.push('\n');
        }
    }

    out
}
