use crate::error::{CollectError, FixError, RuleError};
use crate::fixers::{FixProposer, builtin_proposers};
use crate::rules::{Rule, RuleConfig, builtin_rules};
use rayon::prelude::*;
use tracing::{debug, warn};
use visfix_syntax::Position;
use visfix_types::cancel::{CancelToken, Cancelled};
use visfix_types::document::{Document, Project};
use visfix_types::edit::{CandidateEdit, FixBatch, FixId};
use visfix_types::finding::{Finding, RuleId};
use visfix_types::report::{Failure, FailureKind};

/// Evaluates one rule over a project and gathers the edits for one fix identity.
pub struct BatchCollector {
    rules: Vec<Box<dyn Rule>>,
    proposers: Vec<Box<dyn FixProposer>>,
}

/// Everything a collection pass learned about one project.
#[derive(Debug, Clone)]
pub struct Collection {
    pub batch: FixBatch,
    /// All findings in path order, then document order.
    pub findings: Vec<Finding>,
    pub failures: Vec<Failure>,
    pub documents_scanned: usize,
}

#[derive(Default)]
struct DocumentScan {
    findings: Vec<Finding>,
    edits: Vec<CandidateEdit>,
    failures: Vec<Failure>,
}

impl BatchCollector {
    pub fn new(config: &RuleConfig) -> Self {
        Self::with_parts(builtin_rules(config), builtin_proposers())
    }

    pub fn with_parts(rules: Vec<Box<dyn Rule>>, proposers: Vec<Box<dyn FixProposer>>) -> Self {
        Self { rules, proposers }
    }

    /// Documents are scanned in parallel; the result is independent of scheduling.
    ///
    /// Caller mistakes are reported before any document is visited. Document-scoped
    /// problems end up in [`Collection::failures`].
    pub fn collect(
        &self,
        project: &Project,
        rule: RuleId,
        fix: FixId,
        cancel: &CancelToken,
    ) -> Result<Collection, CollectError> {
        let rule_impl = self
            .rules
            .iter()
            .find(|r| r.id() == rule)
            .ok_or(CollectError::UnknownRule(rule))?;
        if fix.rule() != rule {
            return Err(CollectError::FixRuleMismatch { fix, rule });
        }
        let proposers: Vec<&dyn FixProposer> = self
            .proposers
            .iter()
            .filter(|p| p.rule() == rule)
            .map(|p| p.as_ref())
            .collect();
        if !proposers.iter().any(|p| p.fix_id() == fix) {
            return Err(CollectError::NoProposer(fix));
        }

        let scans = project
            .documents()
            .par_iter()
            .map(|doc| {
                cancel.check()?;
                Ok(scan_document(project, rule_impl.as_ref(), &proposers, fix, doc))
            })
            .collect::<Result<Vec<_>, Cancelled>>()?;

        let mut collection = Collection {
            batch: FixBatch::new(rule, fix),
            findings: vec![],
            failures: vec![],
            documents_scanned: scans.len(),
        };
        let mut rejected = 0usize;
        for scan in scans {
            collection.findings.extend(scan.findings);
            collection.failures.extend(scan.failures);
            for edit in scan.edits {
                if !collection.batch.accept(edit) {
                    rejected += 1;
                }
            }
        }

        debug!(
            project = project.name(),
            documents = collection.documents_scanned,
            findings = collection.findings.len(),
            accepted = collection.batch.len(),
            rejected,
            "collected batch"
        );
        Ok(collection)
    }
}

fn scan_document(
    project: &Project,
    rule: &dyn Rule,
    proposers: &[&dyn FixProposer],
    fix: FixId,
    doc: &Document,
) -> DocumentScan {
    let mut scan = DocumentScan::default();
    let findings = match rule.evaluate(doc) {
        Ok(findings) => findings,
        Err(err) => {
            warn!(project = project.name(), path = %doc.path(), error = %err, "rule evaluation failed");
            scan.failures.push(rule_failure(project, doc, &err));
            return scan;
        }
    };

    for finding in &findings {
        let mut first_error: Option<FixError> = None;
        for proposer in proposers {
            match proposer.propose(doc, finding) {
                Ok(edit) => scan.edits.push(edit),
                // Edits for other identities never enter the batch, so neither do their failures.
                Err(err) if proposer.fix_id() != fix => {
                    debug!(
                        path = %doc.path(),
                        fix = %proposer.fix_id(),
                        error = %err,
                        "unrequested proposal skipped"
                    );
                }
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }
        // One failure per finding, however many proposers could not place it.
        if let Some(err) = first_error {
            warn!(project = project.name(), path = %doc.path(), error = %err, "fix proposal failed");
            scan.failures.push(failure(
                project,
                doc,
                FailureKind::NodeNotFound,
                err.to_string(),
                Some(finding.position),
            ));
        }
    }
    scan.findings = findings;
    scan
}

fn rule_failure(project: &Project, doc: &Document, err: &RuleError) -> Failure {
    failure(
        project,
        doc,
        FailureKind::RuleEvaluationFailed,
        err.to_string(),
        err.position(),
    )
}

fn failure(
    project: &Project,
    doc: &Document,
    kind: FailureKind,
    message: String,
    position: Option<Position>,
) -> Failure {
    Failure {
        project: project.name().to_string(),
        path: doc.path().to_string(),
        kind,
        message,
        line: position.map(|p| p.line),
        column: position.map(|p| p.column),
    }
}
