//! Default filesystem-backed port implementations.

use crate::ports::{ProjectSource, WritePort};
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use glob::Pattern;
use std::collections::BTreeMap;
use tracing::{debug, warn};
use visfix_types::document::{Document, Project};
use walkdir::{DirEntry, WalkDir};

const MANIFEST: &str = "Cargo.toml";

/// Discovers projects under `root`: every directory holding a `Cargo.toml` is one project, and
/// every `.rs` file belongs to the nearest such directory above it.
///
/// `target/` and hidden directories are skipped. Files outside any project fall into a project
/// rooted at `root` and named after it.
#[derive(Debug, Clone)]
pub struct FsProjectSource {
    pub root: Utf8PathBuf,
    pub exclude: Vec<String>,
}

impl FsProjectSource {
    pub fn new(root: Utf8PathBuf) -> Self {
        Self {
            root,
            exclude: Vec::new(),
        }
    }

    pub fn with_exclude(mut self, patterns: Vec<String>) -> Self {
        self.exclude = patterns;
        self
    }

    fn patterns(&self) -> anyhow::Result<Vec<Pattern>> {
        self.exclude
            .iter()
            .map(|p| Pattern::new(p).with_context(|| format!("invalid exclude glob `{}`", p)))
            .collect()
    }

    /// Project directories (relative to root, `""` for root itself) and source files.
    fn scan(&self, exclude: &[Pattern]) -> anyhow::Result<(Vec<Utf8PathBuf>, Vec<Utf8PathBuf>)> {
        let mut project_dirs = Vec::new();
        let mut sources = Vec::new();

        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_skipped_dir(e));
        for entry in walker {
            let entry = entry.with_context(|| format!("walk {}", self.root))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(rel) = relative_utf8(&self.root, &entry) else {
                debug!(path = %entry.path().display(), "skipping non-UTF-8 path");
                continue;
            };
            let rel_posix = rel.as_str().replace('\\', "/");

            if rel.file_name() == Some(MANIFEST) {
                project_dirs.push(rel.parent().map(Utf8Path::to_path_buf).unwrap_or_default());
                continue;
            }
            if rel.extension() != Some("rs") {
                continue;
            }
            if exclude.iter().any(|p| p.matches(&rel_posix)) {
                debug!(path = %rel_posix, "excluded");
                continue;
            }
            sources.push(rel);
        }
        Ok((project_dirs, sources))
    }
}

impl ProjectSource for FsProjectSource {
    fn load_projects(&self) -> anyhow::Result<Vec<Project>> {
        let exclude = self.patterns()?;
        let (mut project_dirs, sources) = self.scan(&exclude)?;
        if !project_dirs.iter().any(|d| d.as_str().is_empty()) {
            project_dirs.push(Utf8PathBuf::new());
        }

        // Nearest enclosing project directory wins.
        let mut grouped: BTreeMap<Utf8PathBuf, Vec<Utf8PathBuf>> = BTreeMap::new();
        for source in sources {
            let owner = project_dirs
                .iter()
                .filter(|dir| source.starts_with(dir))
                .max_by_key(|dir| dir.components().count())
                .cloned()
                .unwrap_or_default();
            grouped.entry(owner).or_default().push(source);
        }

        let mut projects = Vec::with_capacity(grouped.len());
        for (dir, files) in grouped {
            let project_root = if dir.as_str().is_empty() {
                self.root.clone()
            } else {
                self.root.join(&dir)
            };
            let name = project_name(&project_root);
            let mut documents = Vec::with_capacity(files.len());
            for file in files {
                let rel = file.strip_prefix(&dir).unwrap_or(&file).to_path_buf();
                let abs = self.root.join(&file);
                // An unreadable file costs only itself.
                let text = match fs::read_to_string(&abs) {
                    Ok(text) => text,
                    Err(err) => {
                        warn!(
                            project = %name,
                            path = %abs,
                            error = %err,
                            "skipping unreadable source file"
                        );
                        continue;
                    }
                };
                match Document::parse(&name, rel, text) {
                    Ok(doc) => documents.push(doc),
                    Err(err) => {
                        warn!(
                            project = %name,
                            path = %abs,
                            error = %err,
                            "skipping unparsable source file"
                        );
                    }
                }
            }
            debug!(project = %name, root = %project_root, documents = documents.len(), "loaded project");
            projects.push(Project::new(name, project_root, documents));
        }
        projects.sort_by(|a, b| a.root().cmp(b.root()));
        Ok(projects)
    }
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name == "target" || name.starts_with('.')
}

fn relative_utf8(root: &Utf8Path, entry: &DirEntry) -> Option<Utf8PathBuf> {
    let rel = entry.path().strip_prefix(root).ok()?;
    Utf8PathBuf::from_path_buf(rel.to_path_buf()).ok()
}

/// `[package].name` from the directory's manifest, else the directory name.
///
/// A manifest that cannot be read or parsed only loses its name.
fn project_name(dir: &Utf8Path) -> String {
    let fallback = || {
        dir.file_name()
            .map(str::to_string)
            .unwrap_or_else(|| dir.to_string())
    };
    let manifest = dir.join(MANIFEST);
    if !manifest.is_file() {
        return fallback();
    }
    let table = fs::read_to_string(&manifest)
        .context("read manifest")
        .and_then(|contents| toml::from_str::<toml::Table>(&contents).context("parse manifest"));
    match table {
        Ok(table) => table
            .get("package")
            .and_then(|p| p.get("name"))
            .and_then(|n| n.as_str())
            .map(str::to_string)
            .unwrap_or_else(fallback),
        Err(err) => {
            warn!(
                manifest = %manifest,
                error = %format!("{err:#}"),
                "unreadable manifest, using directory name"
            );
            fallback()
        }
    }
}

/// In-memory project source for embedding and testing.
///
/// Sorts by project root on construction to match `FsProjectSource`'s ordering.
#[derive(Debug, Clone)]
pub struct InMemoryProjectSource {
    projects: Vec<Project>,
}

impl InMemoryProjectSource {
    pub fn new(mut projects: Vec<Project>) -> Self {
        projects.sort_by(|a, b| a.root().cmp(b.root()));
        Self { projects }
    }
}

impl ProjectSource for InMemoryProjectSource {
    fn load_projects(&self) -> anyhow::Result<Vec<Project>> {
        Ok(self.projects.clone())
    }
}

/// Filesystem write operations.
#[derive(Debug, Clone, Default)]
pub struct FsWritePort;

impl WritePort for FsWritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create parent dir for {}", path))?;
        }
        fs::write(path, contents).with_context(|| format!("write {}", path))
    }

    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()> {
        fs::create_dir_all(path).with_context(|| format!("create_dir_all {}", path))
    }
}
