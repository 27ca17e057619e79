//! Repository object types returned by listings.
//!
//! Objects serialize to the JSON shape clients expect: a `type` tag of
//! `FOLDER` or `FILE` and camelCase field names.

use serde::{Deserialize, Serialize};

/// Nominal capability tags attached to listed objects.
///
/// Tags are informational only; nothing in this crate enforces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AclMethod {
    None,
    Read,
    Write,
    Grant,
}

/// Tags given to every listed object.
pub const DEFAULT_ACL: [AclMethod; 2] = [AclMethod::Read, AclMethod::Write];

/// A listed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryFileObject {
    /// Display name.
    pub name: String,
    /// Anchor-style identifier, `"#" + path`.
    pub id: String,
    /// The type filter the listing was made with; empty when unfiltered.
    pub file_type: String,
    /// Solution-relative path without a leading slash.
    pub path: String,
    pub acl: Vec<AclMethod>,
}

/// A listed folder and its visible contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryFolderObject {
    pub name: String,
    pub id: String,
    pub path: String,
    pub acl: Vec<AclMethod>,
    /// Direct files first, then nested folders, in document order.
    pub repo_objects: Vec<RepositoryObject>,
}

/// A node of a repository listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum RepositoryObject {
    Folder(RepositoryFolderObject),
    File(RepositoryFileObject),
}

impl RepositoryObject {
    pub(crate) fn file(name: &str, path: String, file_type: &str) -> Self {
        RepositoryObject::File(RepositoryFileObject {
            name: name.to_string(),
            id: format!("#{}", path),
            file_type: file_type.to_string(),
            path,
            acl: DEFAULT_ACL.to_vec(),
        })
    }

    pub(crate) fn folder(name: &str, path: String, children: Vec<RepositoryObject>) -> Self {
        RepositoryObject::Folder(RepositoryFolderObject {
            name: name.to_string(),
            id: format!("#{}", path),
            path,
            acl: DEFAULT_ACL.to_vec(),
            repo_objects: children,
        })
    }

    pub fn name(&self) -> &str {
        match self {
            RepositoryObject::Folder(f) => &f.name,
            RepositoryObject::File(f) => &f.name,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            RepositoryObject::Folder(f) => &f.id,
            RepositoryObject::File(f) => &f.id,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            RepositoryObject::Folder(f) => &f.path,
            RepositoryObject::File(f) => &f.path,
        }
    }

    pub fn acl(&self) -> &[AclMethod] {
        match self {
            RepositoryObject::Folder(f) => &f.acl,
            RepositoryObject::File(f) => &f.acl,
        }
    }

    /// Children of a folder; empty for files.
    pub fn children(&self) -> &[RepositoryObject] {
        match self {
            RepositoryObject::Folder(f) => &f.repo_objects,
            RepositoryObject::File(_) => &[],
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, RepositoryObject::Folder(_))
    }
}
