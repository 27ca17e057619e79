//! Flat identifier validation and decomposition.

use std::sync::Arc;

use thiserror::Error;

use super::{SolutionAddressing, StorageAddressing};

// =============================================================================
// Error Types
// =============================================================================

/// An identifier was absent, blank, or could escape the repository root.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("path cannot be null or start with \"/\" or \".\" - illegal path: {path}")]
pub struct InvalidPathError {
    /// The offending identifier (empty when absent).
    pub path: String,
}

impl InvalidPathError {
    fn new(path: Option<&str>) -> Self {
        Self {
            path: path.unwrap_or_default().to_string(),
        }
    }
}

// =============================================================================
// ResolvedPath
// =============================================================================

/// A validated identifier split into container, intermediate path and leaf.
///
/// `sub_path` keeps the legacy shape expected by address builders: every
/// intermediate segment is prefixed with `/`, so `a/b/c/d` resolves to
/// container `a`, sub-path `/b/c` and leaf `d`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    pub container: String,
    pub sub_path: String,
    pub leaf_name: String,
}

// =============================================================================
// Helpers
// =============================================================================

/// Split on `/`, dropping trailing empty segments but keeping interior ones.
pub(crate) fn split_segments(path: &str) -> Vec<&str> {
    let mut segments: Vec<&str> = path.split('/').collect();
    while segments.last().is_some_and(|s| s.is_empty()) {
        segments.pop();
    }
    segments
}

fn is_escaping(path: &str) -> bool {
    path.starts_with('/') || path.starts_with('.')
}

/// Validate the `path` argument of a repository listing.
///
/// Unlike resource identifiers, a listing path may be absent or blank (meaning
/// the repository root), but it must never start with `/` or `.`.
pub fn validate_listing_path(path: Option<&str>) -> Result<(), InvalidPathError> {
    match path {
        Some(p) if is_escaping(p) => Err(InvalidPathError::new(path)),
        _ => Ok(()),
    }
}

// =============================================================================
// PathResolver
// =============================================================================

/// Validates flat identifiers and builds storage addresses for them.
#[derive(Clone)]
pub struct PathResolver {
    addressing: Arc<dyn StorageAddressing>,
}

impl PathResolver {
    /// Create a resolver using the given addressing convention.
    pub fn new(addressing: Arc<dyn StorageAddressing>) -> Self {
        Self { addressing }
    }

    /// Decompose `identifier` into a [`ResolvedPath`].
    ///
    /// Absent or empty identifiers, and identifiers starting with `/` or `.`,
    /// are rejected.
    pub fn resolve(&self, identifier: Option<&str>) -> Result<ResolvedPath, InvalidPathError> {
        let file = match identifier {
            Some(f) if !f.is_empty() && !is_escaping(f) => f,
            _ => return Err(InvalidPathError::new(identifier)),
        };

        let segments = split_segments(file);
        // Non-empty and not starting with `/`, so the first segment is never
        // empty and survives trailing-segment trimming.
        let (leaf_name, rest) = segments
            .split_last()
            .ok_or_else(|| InvalidPathError::new(identifier))?;

        let container = if segments.len() > 1 { segments[0] } else { "" };
        let sub_path: String = rest
            .iter()
            .skip(1)
            .map(|segment| format!("/{}", segment))
            .collect();

        Ok(ResolvedPath {
            container: container.to_string(),
            sub_path,
            leaf_name: leaf_name.to_string(),
        })
    }

    /// The storage address of the resource itself.
    pub fn address(&self, resolved: &ResolvedPath) -> String {
        self.addressing
            .build(&resolved.container, &resolved.sub_path, &resolved.leaf_name)
    }

    /// The storage address of the directory containing the resource.
    pub fn parent_address(&self, resolved: &ResolvedPath) -> String {
        self.addressing
            .build(&resolved.container, &resolved.sub_path, "")
    }
}

impl Default for PathResolver {
    fn default() -> Self {
        Self::new(Arc::new(SolutionAddressing))
    }
}

impl std::fmt::Debug for PathResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathResolver").finish_non_exhaustive()
    }
}
