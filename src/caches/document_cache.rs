//! Cache-or-fetch access to the repository document.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use super::SessionCache;
use crate::document::{parse_document, DocumentSource, DocumentSourceError, RepositoryNode};
use crate::session::SessionKey;

/// Name under which the repository document is cached for a session.
pub const REPOSITORY_DOCUMENT_CACHE: &str = "REPOSITORY_DOCUMENT";

/// The repository document could not be produced.
#[derive(Debug, Error)]
pub enum DocumentUnavailableError {
    #[error("failed to fetch repository document: {0}")]
    Source(#[from] DocumentSourceError),

    #[error("failed to parse repository document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Returns a session's repository document, fetching it on a cache miss.
///
/// Cached documents are never invalidated here; a session keeps seeing the
/// document it first fetched until the session cache evicts it.
pub struct RepositoryDocumentCache {
    source: Arc<dyn DocumentSource>,
    cache: Arc<dyn SessionCache>,
}

impl RepositoryDocumentCache {
    pub fn new(source: Arc<dyn DocumentSource>, cache: Arc<dyn SessionCache>) -> Self {
        Self { source, cache }
    }

    /// Get the parsed repository document for `session`.
    ///
    /// Failures are reported, never retried.
    pub async fn get_document(
        &self,
        session: &SessionKey,
    ) -> Result<Arc<RepositoryNode>, DocumentUnavailableError> {
        let caching = self.cache.is_enabled();
        if caching {
            if let Some(document) = self.cache.get(session, REPOSITORY_DOCUMENT_CACHE).await {
                debug!(%session, "repository document found in cache");
                return Ok(document);
            }
        }

        let bytes = self.source.fetch_repository_document(session).await?;
        let document = Arc::new(parse_document(&bytes)?);
        debug!(%session, bytes = bytes.len(), "fetched repository document");

        if caching {
            self.cache
                .put(session, REPOSITORY_DOCUMENT_CACHE, document.clone())
                .await;
        }
        Ok(document)
    }
}
