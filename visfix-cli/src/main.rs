mod config;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use config::{ConfigMerger, MergedConfig};
use std::process::ExitCode;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;
use visfix_core::CancelToken;
use visfix_core::adapters::{FsProjectSource, FsWritePort, InMemoryProjectSource};
use visfix_core::pipeline::{
    PassOutcome, ToolError, run_check, run_pass, write_changed_documents, write_pass_artifacts,
};
use visfix_core::ports::ProjectSource;
use visfix_core::settings::PassSettings;
use visfix_domain::builtin_fixer_metas;
use visfix_render::render_findings_text;
use visfix_types::edit::FixId;
use visfix_types::finding::ItemKind;
use visfix_types::report::ToolInfo;

const EXIT_OK: u8 = 0;
const EXIT_ERROR: u8 = 1;
const EXIT_FINDINGS: u8 = 2;
const EXIT_CANCELLED: u8 = 130;

#[derive(Debug, Parser)]
#[command(
    name = "visfix",
    version,
    about = "Finds Rust items without a visibility modifier and fixes them in bulk."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Report items missing a visibility modifier (exit 2 when any are found).
    Check(CheckArgs),
    /// Insert the chosen visibility modifier everywhere it is missing (default: preview only).
    Fix(FixArgs),
    /// List the available fixes.
    ListFixes(ListFixesArgs),
}

#[derive(Debug, clap::Args)]
struct CommonArgs {
    /// Root directory to scan (default: current directory).
    #[arg(long, default_value = ".")]
    root: Utf8PathBuf,

    /// Output directory for report.json, report.md and patch.diff (default: <root>/target/visfix).
    #[arg(long)]
    out_dir: Option<Utf8PathBuf>,

    /// Item kinds to check, comma separated (struct, enum, union, trait, fn, type).
    #[arg(long = "kind", value_delimiter = ',')]
    kinds: Vec<ItemKind>,

    /// Glob patterns to skip, relative to the root. Repeatable.
    #[arg(long)]
    exclude: Vec<String>,
}

#[derive(Debug, Parser)]
struct CheckArgs {
    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Debug, Parser)]
struct FixArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Fix to apply (make_pub, make_pub_crate). Falls back to visfix.toml, then make_pub.
    #[arg(long)]
    fix: Option<FixId>,

    /// Write edited files back to disk.
    #[arg(long)]
    apply: bool,
}

#[derive(Debug, Parser)]
struct ListFixesArgs {
    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    match real_main() {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("{:?}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn real_main() -> anyhow::Result<u8> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Check(args) => run_cancellable(move |cancel| cmd_check(args, &cancel)),
        Command::Fix(args) => run_cancellable(move |cancel| cmd_fix(args, &cancel)),
        Command::ListFixes(args) => cmd_list_fixes(args),
    }
}

/// Run `work` on a blocking task; Ctrl-C trips its cancel token and waits for it to wind down.
fn run_cancellable<F>(work: F) -> anyhow::Result<u8>
where
    F: FnOnce(CancelToken) -> anyhow::Result<u8> + Send + 'static,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("start tokio runtime")?;

    let cancel = CancelToken::new();
    let joined = runtime.block_on(async move {
        let worker_cancel = cancel.clone();
        let mut worker = tokio::task::spawn_blocking(move || work(worker_cancel));
        tokio::select! {
            joined = &mut worker => joined,
            Ok(()) = tokio::signal::ctrl_c() => {
                warn!("interrupt received, cancelling pass");
                cancel.cancel();
                worker.await
            }
        }
    });
    joined.context("pass worker panicked")?
}

fn tool_info() -> ToolInfo {
    ToolInfo {
        name: "visfix".to_string(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
    }
}

fn settings_from(
    common: CommonArgs,
    cli_fix: Option<FixId>,
    apply: bool,
) -> anyhow::Result<PassSettings> {
    let file_config =
        config::load_or_default(&common.root).context("load visfix.toml config")?;
    let MergedConfig {
        fix,
        kinds,
        exclude,
    } = ConfigMerger::new(file_config).merge(cli_fix, &common.kinds, &common.exclude);

    let out_dir = common
        .out_dir
        .unwrap_or_else(|| common.root.join("target").join("visfix"));

    Ok(PassSettings {
        repo_root: common.root,
        out_dir,
        fix,
        kinds,
        exclude,
        apply,
        ..PassSettings::default()
    })
}

fn source_for(settings: &PassSettings) -> FsProjectSource {
    FsProjectSource::new(settings.repo_root.clone()).with_exclude(settings.exclude.clone())
}

fn cmd_check(args: CheckArgs, cancel: &CancelToken) -> anyhow::Result<u8> {
    let settings = settings_from(args.common, None, false)?;
    debug!(root = %settings.repo_root, kinds = ?settings.kinds, "check");

    let outcome = match run_check(&settings, &source_for(&settings), cancel, tool_info()) {
        Ok(outcome) => outcome,
        Err(ToolError::Cancelled) => return Ok(EXIT_CANCELLED),
        Err(ToolError::Internal(e)) => return Err(e),
    };

    print!("{}", render_findings_text(&outcome.findings));
    write_pass_artifacts(&outcome, &settings.out_dir, &FsWritePort)
        .with_context(|| format!("write artifacts to {}", settings.out_dir))?;
    print_failures(&outcome);

    if outcome.report.cancelled {
        return Ok(EXIT_CANCELLED);
    }
    info!(
        findings = outcome.report.summary.findings,
        failures = outcome.report.summary.failures,
        "check complete"
    );
    if outcome.has_findings() || outcome.report.has_failures() {
        Ok(EXIT_FINDINGS)
    } else {
        Ok(EXIT_OK)
    }
}

fn cmd_fix(args: FixArgs, cancel: &CancelToken) -> anyhow::Result<u8> {
    let settings = settings_from(args.common, args.fix, args.apply)?;
    debug!(root = %settings.repo_root, fix = %settings.fix, apply = settings.apply, "fix");

    if cancel.is_cancelled() {
        return Ok(EXIT_CANCELLED);
    }
    // Loaded once so the written documents can be diffed against what was read.
    let before = source_for(&settings)
        .load_projects()
        .context("load projects")?;
    let source = InMemoryProjectSource::new(before.clone());

    let outcome = match run_pass(&settings, &source, cancel, tool_info()) {
        Ok(outcome) => outcome,
        Err(ToolError::Cancelled) => return Ok(EXIT_CANCELLED),
        Err(ToolError::Internal(e)) => return Err(e),
    };

    write_pass_artifacts(&outcome, &settings.out_dir, &FsWritePort)
        .with_context(|| format!("write artifacts to {}", settings.out_dir))?;

    if outcome.report.cancelled {
        return Ok(EXIT_CANCELLED);
    }

    let summary = &outcome.report.summary;
    if settings.apply {
        let written = write_changed_documents(&before, &outcome, &FsWritePort)?;
        println!(
            "visfix: applied {} edit(s) to {} file(s) ({})",
            summary.edits_applied, written, settings.fix
        );
    } else {
        println!(
            "visfix: {} edit(s) in {} file(s) ready ({}); patch at {}",
            summary.edits_applied,
            summary.documents_changed,
            settings.fix,
            settings.out_dir.join("patch.diff")
        );
        if summary.edits_applied > 0 {
            println!("Re-run with --apply to write the changes.");
        }
    }
    print_failures(&outcome);

    if outcome.report.has_failures() {
        Ok(EXIT_FINDINGS)
    } else {
        Ok(EXIT_OK)
    }
}

fn print_failures(outcome: &PassOutcome) {
    for f in &outcome.report.failures {
        let location = match (f.line, f.column) {
            (Some(line), Some(col)) => format!("{}:{}", line, col),
            (Some(line), None) => line.to_string(),
            _ => "-".to_string(),
        };
        eprintln!(
            "{} {}:{}: {}: {}",
            f.project,
            f.path,
            location,
            f.kind.as_str(),
            f.message
        );
    }
}

fn cmd_list_fixes(args: ListFixesArgs) -> anyhow::Result<u8> {
    let metas = builtin_fixer_metas();
    match args.format {
        OutputFormat::Text => {
            println!("Available fixes:\n");
            println!("  {:<16} {:<8} {:<12} TITLE", "FIX", "RULE", "INSERTS");
            println!("  {:<16} {:<8} {:<12} -----", "---", "----", "-------");
            for meta in &metas {
                println!(
                    "  {:<16} {:<8} {:<12} {}",
                    meta.fix_id.as_str(),
                    meta.rule_code,
                    meta.inserts,
                    meta.title
                );
            }
            println!();
            println!("Use 'visfix fix --fix <FIX>' to apply one.");
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&metas)?);
        }
    }
    Ok(EXIT_OK)
}
