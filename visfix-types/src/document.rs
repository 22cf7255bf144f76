use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;
use visfix_syntax::{SyntaxError, SyntaxTree};

const DOCUMENT_NAMESPACE: Uuid = Uuid::from_bytes([
    0x7a, 0x1c, 0x52, 0x0e, 0x93, 0x4b, 0x4f, 0x2d, 0xa6, 0x18, 0x3e, 0x61, 0x0b, 0xc4, 0x9d,
    0x27,
]);

/// Stable document identity, derived from the owning project's name and the relative path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub Uuid);

impl DocumentId {
    pub fn for_path(project: &str, path: &Utf8Path) -> Self {
        let key = format!("{}|{}", project, path.as_str().replace('\\', "/"));
        Self(Uuid::new_v5(&DOCUMENT_NAMESPACE, key.as_bytes()))
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One source file: identity, project-relative path, and its parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    id: DocumentId,
    path: Utf8PathBuf,
    tree: SyntaxTree,
}

impl Document {
    pub fn parse(
        project: &str,
        path: impl Into<Utf8PathBuf>,
        text: impl Into<Arc<str>>,
    ) -> Result<Self, SyntaxError> {
        let path = path.into();
        Ok(Self {
            id: DocumentId::for_path(project, &path),
            tree: SyntaxTree::parse(text)?,
            path,
        })
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        self.tree.text()
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    /// Same identity and path, new content.
    pub fn with_tree(&self, tree: SyntaxTree) -> Document {
        Document {
            id: self.id,
            path: self.path.clone(),
            tree,
        }
    }
}

/// An immutable, path-ordered set of documents.
///
/// Documents sit behind `Arc` so that a project produced by an edit shares every untouched
/// document with the project it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    name: String,
    root: Utf8PathBuf,
    documents: Vec<Arc<Document>>,
}

impl Project {
    pub fn new(
        name: impl Into<String>,
        root: impl Into<Utf8PathBuf>,
        documents: Vec<Document>,
    ) -> Self {
        Self::from_shared(name, root, documents.into_iter().map(Arc::new).collect())
    }

    pub fn from_shared(
        name: impl Into<String>,
        root: impl Into<Utf8PathBuf>,
        mut documents: Vec<Arc<Document>>,
    ) -> Self {
        documents.sort_by(|a, b| a.path().cmp(b.path()));
        Self {
            name: name.into(),
            root: root.into(),
            documents,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory the document paths are relative to.
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn documents(&self) -> &[Arc<Document>] {
        &self.documents
    }

    pub fn document(&self, id: DocumentId) -> Option<&Arc<Document>> {
        self.documents.iter().find(|d| d.id() == id)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// New project with the given documents swapped in by identity.
    ///
    /// Documents without a replacement are carried over by `Arc` clone. Replacements whose id is
    /// not part of this project are ignored.
    pub fn with_replaced(&self, mut replacements: BTreeMap<DocumentId, Document>) -> Project {
        if replacements.is_empty() {
            return self.clone();
        }
        let documents = self
            .documents
            .iter()
            .map(|doc| match replacements.remove(&doc.id()) {
                Some(new) => Arc::new(new),
                None => Arc::clone(doc),
            })
            .collect();
        Project {
            name: self.name.clone(),
            root: self.root.clone(),
            documents,
        }
    }
}
