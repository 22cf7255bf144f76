//! Port traits abstracting all I/O away from the pipeline.

use camino::Utf8Path;
use visfix_types::document::Project;

/// Source of parsed projects.
pub trait ProjectSource {
    /// Projects in a deterministic order, each with its documents ordered by path.
    fn load_projects(&self) -> anyhow::Result<Vec<Project>>;
}

/// File-system write operations.
pub trait WritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()>;
    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()>;
}
