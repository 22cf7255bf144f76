//! Check and fix pipelines.
//!
//! These entry points are I/O-agnostic: loading goes through a [`ProjectSource`] and every write
//! goes through a [`WritePort`].

use crate::ports::{ProjectSource, WritePort};
use crate::settings::PassSettings;
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};
use visfix_domain::{BatchCollector, CollectError, RuleConfig};
use visfix_edit::{apply_batch, render_patch};
use visfix_render::render_report_md;
use visfix_types::cancel::CancelToken;
use visfix_types::document::Project;
use visfix_types::edit::FixId;
use visfix_types::finding::{Finding, RuleId};
use visfix_types::report::{PassReport, ProjectReport, ToolInfo};

/// Error type for pipeline results. Exit code 130 = cancelled, 1 = tool error.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("cancelled")]
    Cancelled,
    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

/// Outcome of a pass over every project.
#[derive(Debug, Clone)]
pub struct PassOutcome {
    /// One project per input project, same order. Equal to the input when cancelled.
    pub projects: Vec<Project>,
    pub report: PassReport,
    pub findings: Vec<Finding>,
    /// Unified diff between the input and output projects. Empty for check passes.
    pub patch: String,
}

impl PassOutcome {
    pub fn has_findings(&self) -> bool {
        !self.findings.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Check,
    Fix,
}

/// Runs collection then application for each project in turn.
pub struct Driver {
    collector: BatchCollector,
    tool: ToolInfo,
    patch_base: Option<Utf8PathBuf>,
}

impl Driver {
    pub fn new(config: &RuleConfig, tool: ToolInfo) -> Self {
        Self::with_collector(BatchCollector::new(config), tool)
    }

    pub fn with_collector(collector: BatchCollector, tool: ToolInfo) -> Self {
        Self {
            collector,
            tool,
            patch_base: None,
        }
    }

    /// Make patch paths relative to `base` instead of absolute.
    pub fn with_patch_base(mut self, base: impl Into<Utf8PathBuf>) -> Self {
        self.patch_base = Some(base.into());
        self
    }

    /// Collect and apply `fix` across every project.
    ///
    /// Caller mistakes (unknown rule, fix for another rule) fail the whole pass before any
    /// document is read. Cancellation does not: it returns the input projects and a report
    /// marked `cancelled`.
    pub fn run(
        &self,
        projects: &[Project],
        rule: RuleId,
        fix: FixId,
        cancel: &CancelToken,
    ) -> Result<PassOutcome, CollectError> {
        self.pass(projects, rule, fix, cancel, Mode::Fix)
    }

    /// Collect only. Projects come back unchanged; the report counts findings and accepted edits.
    pub fn check(
        &self,
        projects: &[Project],
        rule: RuleId,
        fix: FixId,
        cancel: &CancelToken,
    ) -> Result<PassOutcome, CollectError> {
        self.pass(projects, rule, fix, cancel, Mode::Check)
    }

    fn pass(
        &self,
        projects: &[Project],
        rule: RuleId,
        fix: FixId,
        cancel: &CancelToken,
        mode: Mode,
    ) -> Result<PassOutcome, CollectError> {
        let mut report = PassReport::new(self.tool.clone(), rule, fix);
        let mut outputs = Vec::with_capacity(projects.len());
        let mut findings = Vec::new();

        for project in projects {
            let collection = match self.collector.collect(project, rule, fix, cancel) {
                Ok(c) => c,
                Err(CollectError::Cancelled(_)) => return Ok(cancelled(projects, report)),
                Err(err) => return Err(err),
            };

            let mut project_report = ProjectReport {
                name: project.name().to_string(),
                documents_scanned: collection.documents_scanned as u64,
                findings: collection.findings.len() as u64,
                edits_accepted: collection.batch.len() as u64,
                changes: vec![],
            };
            report.failures.extend(collection.failures);
            findings.extend(collection.findings);

            let output = match mode {
                Mode::Check => project.clone(),
                Mode::Fix => {
                    let Ok(applied) = apply_batch(project, &collection.batch, cancel) else {
                        return Ok(cancelled(projects, report));
                    };
                    project_report.changes = applied.changes;
                    report.failures.extend(applied.failures);
                    applied.project
                }
            };

            info!(
                project = project.name(),
                findings = project_report.findings,
                accepted = project_report.edits_accepted,
                changed = project_report.changes.len(),
                "project pass complete"
            );
            report.projects.push(project_report);
            outputs.push(output);
        }

        report.finish();
        let patch = match mode {
            Mode::Check => String::new(),
            Mode::Fix => self.patch(projects, &outputs),
        };
        Ok(PassOutcome {
            projects: outputs,
            report,
            findings,
            patch,
        })
    }

    fn patch(&self, before: &[Project], after: &[Project]) -> String {
        let mut old = BTreeMap::new();
        let mut new = BTreeMap::new();
        for (b, a) in before.iter().zip(after) {
            for (db, da) in b.documents().iter().zip(a.documents()) {
                if Arc::ptr_eq(db, da) {
                    continue;
                }
                let path = self.patch_path(b.root(), db.path());
                old.insert(path.clone(), db.text().to_string());
                new.insert(path, da.text().to_string());
            }
        }
        render_patch(&old, &new)
    }

    fn patch_path(&self, project_root: &Utf8Path, doc: &Utf8Path) -> Utf8PathBuf {
        let root = match &self.patch_base {
            Some(base) => project_root.strip_prefix(base).unwrap_or(project_root),
            None => project_root,
        };
        let joined = root.join(doc);
        Utf8PathBuf::from(joined.as_str().replace('\\', "/"))
    }
}

fn cancelled(projects: &[Project], mut report: PassReport) -> PassOutcome {
    info!("pass cancelled; discarding partial results");
    report.cancelled = true;
    report.projects.clear();
    report.failures.clear();
    report.finish();
    PassOutcome {
        projects: projects.to_vec(),
        report,
        findings: vec![],
        patch: String::new(),
    }
}

/// Load projects and run a fix pass. Does not write anything.
///
/// The caller decides whether to persist documents (`write_changed_documents`) and artifacts
/// (`write_pass_artifacts`).
pub fn run_pass(
    settings: &PassSettings,
    source: &dyn ProjectSource,
    cancel: &CancelToken,
    tool: ToolInfo,
) -> Result<PassOutcome, ToolError> {
    let (driver, projects) = prepare(settings, source, cancel, tool)?;
    let outcome = driver
        .run(&projects, settings.rule, settings.fix, cancel)
        .context("run fix pass")?;
    Ok(outcome)
}

/// Load projects and report findings without editing.
pub fn run_check(
    settings: &PassSettings,
    source: &dyn ProjectSource,
    cancel: &CancelToken,
    tool: ToolInfo,
) -> Result<PassOutcome, ToolError> {
    let (driver, projects) = prepare(settings, source, cancel, tool)?;
    let outcome = driver
        .check(&projects, settings.rule, settings.fix, cancel)
        .context("run check pass")?;
    Ok(outcome)
}

fn prepare(
    settings: &PassSettings,
    source: &dyn ProjectSource,
    cancel: &CancelToken,
    tool: ToolInfo,
) -> Result<(Driver, Vec<Project>), ToolError> {
    if cancel.is_cancelled() {
        return Err(ToolError::Cancelled);
    }
    let projects = source.load_projects().context("load projects")?;
    debug!(
        projects = projects.len(),
        rule = %settings.rule,
        fix = %settings.fix,
        "loaded projects"
    );
    let driver =
        Driver::new(&settings.rule_config(), tool).with_patch_base(settings.repo_root.clone());
    Ok((driver, projects))
}

/// Write every document that differs between `before` and `outcome.projects`.
///
/// Returns the number of files written. Nothing is written for a cancelled pass.
pub fn write_changed_documents(
    before: &[Project],
    outcome: &PassOutcome,
    writer: &dyn WritePort,
) -> anyhow::Result<usize> {
    if outcome.report.cancelled {
        return Ok(0);
    }
    let mut written = 0;
    for (b, a) in before.iter().zip(&outcome.projects) {
        for (db, da) in b.documents().iter().zip(a.documents()) {
            if Arc::ptr_eq(db, da) || db.text() == da.text() {
                continue;
            }
            let path = a.root().join(da.path());
            writer
                .write_file(&path, da.text().as_bytes())
                .with_context(|| format!("write edited document {}", path))?;
            written += 1;
        }
    }
    info!(written, "wrote edited documents");
    Ok(written)
}

/// Write `report.json`, `report.md` and `patch.diff` into `out_dir`.
pub fn write_pass_artifacts(
    outcome: &PassOutcome,
    out_dir: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    writer.create_dir_all(out_dir)?;

    let report_json =
        serde_json::to_string_pretty(&outcome.report).context("serialize report")?;
    writer.write_file(&out_dir.join("report.json"), report_json.as_bytes())?;

    let report_md = render_report_md(&outcome.report);
    writer.write_file(&out_dir.join("report.md"), report_md.as_bytes())?;

    writer.write_file(&out_dir.join("patch.diff"), outcome.patch.as_bytes())?;
    Ok(())
}
