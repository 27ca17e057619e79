//! Sources of repository documents.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use thiserror::Error;

use super::RepositoryNode;
use crate::session::SessionKey;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur while producing a repository document.
#[derive(Debug, Error)]
pub enum DocumentSourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type for document source operations.
pub type Result<T> = std::result::Result<T, DocumentSourceError>;

// =============================================================================
// DocumentSource Trait
// =============================================================================

/// Produces the serialized repository document for a session.
///
/// Called only when no cached document is available, so implementations may
/// be expensive.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch_repository_document(&self, session: &SessionKey) -> Result<Vec<u8>>;
}

// =============================================================================
// FsDocumentSource
// =============================================================================

/// Serves a pre-rendered JSON document from a file.
pub struct FsDocumentSource {
    path: PathBuf,
}

impl FsDocumentSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DocumentSource for FsDocumentSource {
    async fn fetch_repository_document(&self, _session: &SessionKey) -> Result<Vec<u8>> {
        Ok(tokio::fs::read(&self.path).await?)
    }
}

// =============================================================================
// ScanDocumentSource
// =============================================================================

/// Renders the repository document by walking a solution directory.
///
/// Directories and regular files become nodes, sorted by name. Entries whose
/// name starts with `.` are included but marked invisible. The root declares
/// `path = "/" + <root directory name>`.
pub struct ScanDocumentSource {
    root: PathBuf,
}

impl ScanDocumentSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Walk the solution directory into a document tree.
    pub async fn scan(&self) -> Result<RepositoryNode> {
        let root_name = self
            .root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let children = scan_directory(self.root.clone()).await?;
        Ok(RepositoryNode::root(format!("/{}", root_name), children))
    }
}

fn scan_directory(dir: PathBuf) -> BoxFuture<'static, Result<Vec<RepositoryNode>>> {
    async move {
        let mut entries = Vec::new();
        let mut read_dir = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = read_dir.next_entry().await? {
            let file_type = entry.file_type().await?;
            let name = entry.file_name().to_string_lossy().into_owned();
            entries.push((name, entry.path(), file_type));
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let mut nodes = Vec::with_capacity(entries.len());
        for (name, path, file_type) in entries {
            let visible = !is_hidden(&name);
            if file_type.is_dir() {
                let children = scan_directory(path).await?;
                nodes.push(RepositoryNode::directory(name, visible, children));
            } else if file_type.is_file() {
                nodes.push(RepositoryNode::file(name, visible));
            }
        }
        Ok(nodes)
    }
    .boxed()
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

#[async_trait]
impl DocumentSource for ScanDocumentSource {
    async fn fetch_repository_document(&self, _session: &SessionKey) -> Result<Vec<u8>> {
        let document = self.scan().await?;
        Ok(serde_json::to_vec(&document)?)
    }
}

// =============================================================================
// MemoryDocumentSource
// =============================================================================

/// Serves fixed document bytes and counts how often it was asked.
pub struct MemoryDocumentSource {
    document: Option<Vec<u8>>,
    fetches: AtomicUsize,
}

impl MemoryDocumentSource {
    pub fn new(document: impl Into<Vec<u8>>) -> Self {
        Self {
            document: Some(document.into()),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Serialize `root` and serve it.
    pub fn from_node(root: &RepositoryNode) -> Result<Self> {
        Ok(Self::new(serde_json::to_vec(root)?))
    }

    /// A source that fails every fetch.
    pub fn unavailable() -> Self {
        Self {
            document: None,
            fetches: AtomicUsize::new(0),
        }
    }

    /// Number of fetches performed so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentSource for MemoryDocumentSource {
    async fn fetch_repository_document(&self, _session: &SessionKey) -> Result<Vec<u8>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.document
            .clone()
            .ok_or_else(|| DocumentSourceError::Other("repository document unavailable".into()))
    }
}
