//! Batch application across documents: isolation, sharing, and agreement with one-at-a-time fixing.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::sync::Arc;
use visfix_domain::{BatchCollector, RuleConfig};
use visfix_edit::apply_batch;
use visfix_types::Span;
use visfix_types::cancel::CancelToken;
use visfix_types::document::{Document, Project};
use visfix_types::edit::{CandidateEdit, FixBatch, FixId};
use visfix_types::finding::RuleId;
use visfix_types::report::FailureKind;

fn doc(path: &str, text: &str) -> Document {
    Document::parse("demo", path, text).expect("parse")
}

fn batch_for(project: &Project, fix: FixId) -> FixBatch {
    BatchCollector::new(&RuleConfig::default())
        .collect(project, RuleId::MissingVisibility, fix, &CancelToken::new())
        .expect("collect")
        .batch
}

#[test]
fn untouched_documents_are_shared() {
    let project = Project::new(
        "demo",
        "/repo",
        vec![
            doc("src/a.rs", "struct A;\n"),
            doc("src/b.rs", "pub struct B;\n"),
        ],
    );
    let batch = batch_for(&project, FixId::MakePub);
    let applied = apply_batch(&project, &batch, &CancelToken::new()).expect("apply");

    let before = project.documents();
    let after = applied.project.documents();
    assert!(!Arc::ptr_eq(&before[0], &after[0]));
    assert!(Arc::ptr_eq(&before[1], &after[1]));
    assert_eq!(after[0].text(), "pub struct A;\n");
    assert_eq!(applied.changes.len(), 1);
    assert_eq!(applied.changes[0].path, "src/a.rs");
    assert_eq!(applied.changes[0].edits, 1);
    assert_ne!(applied.changes[0].sha256_before, applied.changes[0].sha256_after);
    // The input project is untouched.
    assert_eq!(project.documents()[0].text(), "struct A;\n");
}

#[test]
fn overlapping_document_fails_alone() {
    let project = Project::new(
        "demo",
        "/repo",
        vec![
            doc("src/a.rs", "struct A;\n"),
            doc("src/b.rs", "struct B;\n"),
        ],
    );
    let mut batch = batch_for(&project, FixId::MakePub);
    let a = project.documents()[0].id();
    let duplicate: CandidateEdit = batch.edits_for(a)[0].clone();
    let clash = CandidateEdit {
        replacement: "pub(in crate) ".to_string(),
        ..duplicate
    };
    assert!(batch.accept(clash));

    let applied = apply_batch(&project, &batch, &CancelToken::new()).expect("apply");
    assert_eq!(applied.failures.len(), 1);
    assert_eq!(applied.failures[0].kind, FailureKind::OverlappingEdits);
    assert_eq!(applied.failures[0].path, "src/a.rs");
    assert!(Arc::ptr_eq(
        &project.documents()[0],
        &applied.project.documents()[0]
    ));
    assert_eq!(applied.project.documents()[1].text(), "pub struct B;\n");
}

#[test]
fn syntax_breaking_edit_is_rolled_back() {
    let project = Project::new("demo", "/repo", vec![doc("src/a.rs", "struct A;\nstruct B;\n")]);
    let mut batch = batch_for(&project, FixId::MakePub);
    let id = project.documents()[0].id();
    let first = batch.edits_for(id)[0].clone();
    let broken = CandidateEdit {
        span: Span::empty(first.span.start + 8),
        replacement: "{".to_string(),
        ..first
    };
    assert!(batch.accept(broken));

    let applied = apply_batch(&project, &batch, &CancelToken::new()).expect("apply");
    assert_eq!(applied.failures.len(), 1);
    assert_eq!(applied.failures[0].kind, FailureKind::SyntaxBroken);
    assert!(applied.changes.is_empty());
    assert_eq!(applied.project, project);
}

#[test]
fn cancelled_application_returns_nothing() {
    let project = Project::new("demo", "/repo", vec![doc("src/a.rs", "struct A;\n")]);
    let batch = batch_for(&project, FixId::MakePub);
    let cancel = CancelToken::new();
    cancel.cancel();
    assert!(apply_batch(&project, &batch, &cancel).is_err());
}

#[test]
fn second_pass_finds_nothing() {
    let project = Project::new(
        "demo",
        "/repo",
        vec![doc("src/a.rs", "struct A;\nmod m {\n    enum E {}\n}\n")],
    );
    let once = apply_batch(&project, &batch_for(&project, FixId::MakePubCrate), &CancelToken::new())
        .expect("apply");
    let again = batch_for(&once.project, FixId::MakePubCrate);
    assert!(again.is_empty());
    assert_eq!(
        once.project.documents()[0].text(),
        "pub(crate) struct A;\nmod m {\n    pub(crate) enum E {}\n}\n"
    );
}

fn arb_source() -> impl Strategy<Value = String> {
    let item = prop::sample::select(vec![
        "struct S;",
        "pub struct P;",
        "#[derive(Debug)]\nenum E { A, B }",
        "unsafe trait T {}",
        "union U { x: u32 }",
        "mod m { struct N; }",
        "fn f() { struct Local; }",
        "// comment",
    ]);
    prop::collection::vec(item, 0..8).prop_map(|items| items.join("\n"))
}

/// Fix one finding at a time: parse, collect, apply the first edit, parse again from scratch.
fn fix_one_at_a_time(text: &str, fix: FixId) -> Document {
    let mut current = doc("src/lib.rs", text);
    let limit = text.len() + 1;
    for _ in 0..limit {
        let project = Project::new("demo", "/repo", vec![current.clone()]);
        let batch = batch_for(&project, fix);
        let Some(edit) = batch.edits_for(current.id()).first() else {
            return current;
        };
        let mut next = current.text().to_string();
        next.replace_range(edit.span.start..edit.span.end, &edit.replacement);
        current = doc("src/lib.rs", &next);
    }
    panic!("findings never ran out for {text:?}");
}

proptest! {
    /// Applying the whole batch at once gives the same document as fixing findings one by one
    /// with a fresh parse in between.
    #[test]
    fn batch_matches_one_at_a_time_fixing(text in arb_source(), crate_vis in any::<bool>()) {
        let fix = if crate_vis { FixId::MakePubCrate } else { FixId::MakePub };
        let project = Project::new("demo", "/repo", vec![doc("src/lib.rs", &text)]);
        let batch = batch_for(&project, fix);
        let applied = apply_batch(&project, &batch, &CancelToken::new()).expect("apply");
        prop_assert!(applied.failures.is_empty());

        let sequential = fix_one_at_a_time(&text, fix);
        let result = &applied.project.documents()[0];
        prop_assert_eq!(result.text(), sequential.text());
        prop_assert_eq!(
            result.tree().root().to_sexp(),
            sequential.tree().root().to_sexp()
        );
        prop_assert!(batch_for(&applied.project, fix).is_empty());
    }
}
