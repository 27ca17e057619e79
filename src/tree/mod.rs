//! Application-level repository object tree.
//!
//! [`flatten`] turns a repository document into the ordered, filtered list of
//! [`RepositoryObject`]s handed to clients.

mod flatten;
mod repository_object;

pub use flatten::{flatten, matches_type_filter, FlattenError};
pub use repository_object::{
    AclMethod, RepositoryFileObject, RepositoryFolderObject, RepositoryObject, DEFAULT_ACL,
};
