use crate::edit::FixId;
use crate::finding::RuleId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Outcome of one full pass (all projects) for a rule/fix pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassReport {
    pub schema: String,
    pub run_id: String,
    pub tool: ToolInfo,
    pub rule: RuleId,
    pub fix: FixId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,

    /// True when the pass was cancelled; no edits were committed.
    #[serde(default)]
    pub cancelled: bool,

    #[serde(default)]
    pub projects: Vec<ProjectReport>,

    #[serde(default)]
    pub failures: Vec<Failure>,

    pub summary: PassSummary,
}

impl PassReport {
    pub fn new(tool: ToolInfo, rule: RuleId, fix: FixId) -> Self {
        Self {
            schema: crate::schema::VISFIX_REPORT_V1.to_string(),
            run_id: Uuid::new_v4().to_string(),
            tool,
            rule,
            fix,
            started_at: Some(Utc::now()),
            ended_at: None,
            cancelled: false,
            projects: vec![],
            failures: vec![],
            summary: PassSummary::default(),
        }
    }

    /// Stamp the end time and recompute the summary from projects and failures.
    pub fn finish(&mut self) {
        self.ended_at = Some(Utc::now());
        let mut summary = PassSummary {
            projects: self.projects.len() as u64,
            failures: self.failures.len() as u64,
            ..PassSummary::default()
        };
        for p in &self.projects {
            summary.documents_scanned += p.documents_scanned;
            summary.findings += p.findings;
            summary.edits_accepted += p.edits_accepted;
            summary.edits_applied += p.changes.iter().map(|c| c.edits).sum::<u64>();
            summary.documents_changed += p.changes.len() as u64;
        }
        self.summary = summary;
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectReport {
    pub name: String,
    pub documents_scanned: u64,
    pub findings: u64,
    pub edits_accepted: u64,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<DocumentChange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentChange {
    pub path: String,
    pub edits: u64,
    pub sha256_before: String,
    pub sha256_after: String,
}

/// A document-scoped problem. Never aborts more than the document it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub project: String,
    pub path: String,
    pub kind: FailureKind,
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// A finding's location no longer resolved to a fixable item.
    NodeNotFound,
    /// Two edits for one document collide; none of that document's edits were applied.
    OverlappingEdits,
    /// The rule could not evaluate the document (e.g. the file has syntax errors).
    RuleEvaluationFailed,
    /// The edited document no longer parses cleanly; none of its edits were applied.
    SyntaxBroken,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::NodeNotFound => "node_not_found",
            FailureKind::OverlappingEdits => "overlapping_edits",
            FailureKind::RuleEvaluationFailed => "rule_evaluation_failed",
            FailureKind::SyntaxBroken => "syntax_broken",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassSummary {
    pub projects: u64,
    pub documents_scanned: u64,
    pub findings: u64,
    pub edits_accepted: u64,
    pub edits_applied: u64,
    pub documents_changed: u64,
    pub failures: u64,
}
