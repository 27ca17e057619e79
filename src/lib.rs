//! solution-repository - A virtual document repository over pluggable storage.
//!
//! The repository document is flattened into folder and file objects for
//! listing; individual resources are loaded and saved through a
//! [`storage::StorageProvider`] addressed by validated flat identifiers.

pub mod app;
pub mod caches;
pub mod cli;
pub mod config;
pub mod document;
pub mod gateway;
pub mod path;
pub mod session;
pub mod storage;
pub mod tree;

pub use app::{App, AppContext, AppError, AppParts, ResourceResponse};
pub use path::{InvalidPathError, PathResolver, ResolvedPath};
pub use session::{SessionIdentity, SessionKey, StaticSessionIdentity};
pub use tree::{AclMethod, RepositoryObject};
