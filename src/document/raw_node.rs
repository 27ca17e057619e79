//! Node capabilities and the concrete document node type.

use serde::{Deserialize, Serialize};

// =============================================================================
// RawNode Trait
// =============================================================================

/// Read access to one node of a repository document.
///
/// Attribute accessors return `None` when the attribute is missing. Child
/// queries mirror the document's structural selectors: a child is a directory
/// only if it says `isDirectory = true`, and a file only if it says
/// `isDirectory = false`.
pub trait RawNode {
    /// Raw name of the node, used to build paths.
    fn name(&self) -> Option<&str>;

    /// Display name of the node.
    fn localized_name(&self) -> Option<&str>;

    /// Whether the node should be listed. A missing attribute means hidden.
    fn visible(&self) -> bool;

    fn is_directory(&self) -> Option<bool>;

    /// Path attribute declared on the document root.
    fn declared_path(&self) -> Option<&str>;

    /// Direct children marked as directories, in document order.
    fn child_directories(&self) -> Vec<&Self>;

    /// Direct children marked as files, in document order.
    fn child_files(&self) -> Vec<&Self>;
}

// =============================================================================
// RepositoryNode
// =============================================================================

/// A parsed repository document node.
///
/// Every attribute is optional at parse time so that a malformed node is
/// reported while the tree is being walked rather than rejecting the whole
/// document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(
        rename = "localized-name",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub localized_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,

    #[serde(rename = "isDirectory", default, skip_serializing_if = "Option::is_none")]
    pub is_directory: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RepositoryNode>,
}

impl RepositoryNode {
    /// A directory node whose display name equals its raw name.
    pub fn directory(name: impl Into<String>, visible: bool, children: Vec<RepositoryNode>) -> Self {
        let name = name.into();
        Self {
            localized_name: Some(name.clone()),
            name: Some(name),
            visible: Some(visible),
            is_directory: Some(true),
            path: None,
            children,
        }
    }

    /// A file node whose display name equals its raw name.
    pub fn file(name: impl Into<String>, visible: bool) -> Self {
        let name = name.into();
        Self {
            localized_name: Some(name.clone()),
            name: Some(name),
            visible: Some(visible),
            is_directory: Some(false),
            path: None,
            children: Vec::new(),
        }
    }

    /// A document root declaring `path`.
    pub fn root(path: impl Into<String>, children: Vec<RepositoryNode>) -> Self {
        Self {
            path: Some(path.into()),
            children,
            ..Default::default()
        }
    }

    pub fn with_localized_name(mut self, localized_name: impl Into<String>) -> Self {
        self.localized_name = Some(localized_name.into());
        self
    }
}

impl RawNode for RepositoryNode {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn localized_name(&self) -> Option<&str> {
        self.localized_name.as_deref()
    }

    fn visible(&self) -> bool {
        self.visible == Some(true)
    }

    fn is_directory(&self) -> Option<bool> {
        self.is_directory
    }

    fn declared_path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    fn child_directories(&self) -> Vec<&Self> {
        self.children
            .iter()
            .filter(|c| c.is_directory == Some(true))
            .collect()
    }

    fn child_files(&self) -> Vec<&Self> {
        self.children
            .iter()
            .filter(|c| c.is_directory == Some(false))
            .collect()
    }
}

/// Parse a JSON repository document.
pub fn parse_document(bytes: &[u8]) -> serde_json::Result<RepositoryNode> {
    serde_json::from_slice(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document() {
        let json = br#"{
            "path": "/solutions",
            "children": [
                {"name": "reports", "localized-name": "Reports", "visible": true, "isDirectory": true,
                 "children": [
                    {"name": "q1.saiku", "localized-name": "Q1", "visible": true, "isDirectory": false}
                 ]},
                {"name": "readme.txt", "localized-name": "Readme", "visible": false, "isDirectory": false},
                {"name": "odd"}
            ]
        }"#;

        let root = parse_document(json).unwrap();
        assert_eq!(root.declared_path(), Some("/solutions"));

        let dirs = root.child_directories();
        assert_eq!(dirs.len(), 1);
        assert_eq!(dirs[0].name(), Some("reports"));
        assert_eq!(dirs[0].localized_name(), Some("Reports"));
        assert!(dirs[0].visible());
        assert_eq!(dirs[0].child_files()[0].name(), Some("q1.saiku"));

        let files = root.child_files();
        assert_eq!(files.len(), 1);
        assert!(!files[0].visible());
    }

    #[test]
    fn test_node_without_directory_flag_is_neither() {
        let root = RepositoryNode::root(
            "/solutions",
            vec![RepositoryNode {
                name: Some("odd".to_string()),
                ..Default::default()
            }],
        );
        assert!(root.child_directories().is_empty());
        assert!(root.child_files().is_empty());
    }

    #[test]
    fn test_missing_visible_means_hidden() {
        let node = RepositoryNode {
            name: Some("x".to_string()),
            ..Default::default()
        };
        assert!(!node.visible());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_document(b"<repository/>").is_err());
    }
}
