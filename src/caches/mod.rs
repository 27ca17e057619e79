//! Caches for repository documents.
//!
//! The cache system is layered:
//!
//! 1. **SessionCache** - session-scoped key/value storage
//!    - [`MemorySessionCache`] - in-memory, optionally LRU-bounded
//!    - [`NoopSessionCache`] - disabled caching
//!
//! 2. **RepositoryDocumentCache** - cache-or-fetch access to the parsed
//!    repository document of a session

mod document_cache;
mod session_cache;

pub use document_cache::{
    DocumentUnavailableError, RepositoryDocumentCache, REPOSITORY_DOCUMENT_CACHE,
};
pub use session_cache::{MemorySessionCache, NoopSessionCache, SessionCache};
