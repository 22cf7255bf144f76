//! Rendering helpers (markdown) for human-readable artifacts.

use visfix_types::finding::Finding;
use visfix_types::report::{Failure, PassReport};

pub fn render_report_md(report: &PassReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "# visfix {} ({})\n\n",
        report.rule.code(),
        report.fix
    ));
    if report.cancelled {
        out.push_str("> Pass cancelled. No documents were changed.\n\n");
    }

    let s = &report.summary;
    out.push_str(&format!(
        "- Projects: {}\n- Documents scanned: {}\n- Findings: {}\n- Edits accepted: {}\n- Edits applied: {} in {} document(s)\n- Failures: {}\n\n",
        s.projects,
        s.documents_scanned,
        s.findings,
        s.edits_accepted,
        s.edits_applied,
        s.documents_changed,
        s.failures
    ));

    out.push_str("## Projects\n\n");
    if report.projects.is_empty() {
        out.push_str("_No projects._\n\n");
    } else {
        out.push_str("| Project | Documents | Findings | Accepted | Changed |\n");
        out.push_str("|---|---:|---:|---:|---:|\n");
        for p in &report.projects {
            out.push_str(&format!(
                "| `{}` | {} | {} | {} | {} |\n",
                p.name,
                p.documents_scanned,
                p.findings,
                p.edits_accepted,
                p.changes.len()
            ));
        }
        out.push('\n');

        let changed: Vec<_> = report
            .projects
            .iter()
            .flat_map(|p| p.changes.iter().map(move |c| (p.name.as_str(), c)))
            .collect();
        if !changed.is_empty() {
            out.push_str("**Documents changed**\n\n");
            for (project, c) in changed {
                out.push_str(&format!(
                    "- `{}` `{}` ({} edit(s)) {} → {}\n",
                    project,
                    c.path,
                    c.edits,
                    short_sha(&c.sha256_before),
                    short_sha(&c.sha256_after)
                ));
            }
            out.push('\n');
        }
    }

    out.push_str("## Failures\n\n");
    if report.failures.is_empty() {
        out.push_str("_No failures._\n");
        return out;
    }
    for f in &report.failures {
        out.push_str(&format!(
            "- `{}` `{}`: {} ({})\n",
            f.project,
            failure_location(f),
            f.message,
            f.kind.as_str()
        ));
    }

    out
}

/// One line per finding, compiler style: `path:line:col: CODE message`.
pub fn render_findings_text(findings: &[Finding]) -> String {
    let mut out = String::new();
    for f in findings {
        out.push_str(&format!(
            "{}:{}: {} {}\n",
            f.path,
            f.position,
            f.rule.code(),
            f.message()
        ));
    }
    out
}

fn failure_location(f: &Failure) -> String {
    match (f.line, f.column) {
        (Some(line), Some(col)) => format!("{}:{}:{}", f.path, line, col),
        (Some(line), None) => format!("{}:{}", f.path, line),
        _ => f.path.clone(),
    }
}

fn short_sha(sha: &str) -> &str {
    sha.get(..12).unwrap_or(sha)
}
