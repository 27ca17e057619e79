//! Top-level application component.
//!
//! The [`App`] owns the collaborators behind the repository and exposes the
//! four operations clients use: listing the repository, and loading, saving
//! and deleting a single resource.

use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, error, warn};

use super::ResourceResponse;
use crate::caches::{
    DocumentUnavailableError, MemorySessionCache, NoopSessionCache, RepositoryDocumentCache,
    SessionCache,
};
use crate::config::{read_config, ConfigError, ConfigHelper, ConfigSource};
use crate::document::{DocumentSource, FsDocumentSource, ScanDocumentSource};
use crate::gateway::{GatewayError, ResourceGateway};
use crate::path::{
    validate_listing_path, InvalidPathError, PathResolver, SolutionAddressing, StorageAddressing,
};
use crate::session::{SessionIdentity, StaticSessionIdentity};
use crate::storage::{FsStorageProvider, StorageProvider};
use crate::tree::{flatten, RepositoryObject};

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during App operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for App operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Why a listing produced nothing.
#[derive(Debug, Error)]
enum ListingError {
    #[error("{0}")]
    InvalidPath(#[from] InvalidPathError),

    #[error("repository document unavailable: {0}")]
    Document(#[from] DocumentUnavailableError),
}

// =============================================================================
// Context Types
// =============================================================================

/// Context for creating an App from configuration.
#[derive(Debug, Default)]
pub struct AppContext {
    /// Source for configuration files.
    pub config_source: ConfigSource,
}

/// Collaborators an [`App`] is assembled from.
pub struct AppParts {
    pub document_source: Arc<dyn DocumentSource>,
    pub session_cache: Arc<dyn SessionCache>,
    /// `None` makes every resource operation fail with a server error.
    pub storage: Option<Arc<dyn StorageProvider>>,
    pub identity: Arc<dyn SessionIdentity>,
    pub addressing: Arc<dyn StorageAddressing>,
    /// Publish base passed through to the storage provider.
    pub root_base: String,
}

impl AppParts {
    /// Parts with no caching, no storage, the solution addressing convention
    /// and the given identity.
    pub fn new(
        document_source: Arc<dyn DocumentSource>,
        identity: Arc<dyn SessionIdentity>,
    ) -> Self {
        Self {
            document_source,
            session_cache: Arc::new(NoopSessionCache),
            storage: None,
            identity,
            addressing: Arc::new(SolutionAddressing),
            root_base: String::new(),
        }
    }

    pub fn with_session_cache(mut self, cache: Arc<dyn SessionCache>) -> Self {
        self.session_cache = cache;
        self
    }

    pub fn with_storage(mut self, storage: Arc<dyn StorageProvider>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn with_root_base(mut self, root_base: impl Into<String>) -> Self {
        self.root_base = root_base.into();
        self
    }
}

// =============================================================================
// App
// =============================================================================

/// The top-level application component.
pub struct App {
    documents: RepositoryDocumentCache,
    gateway: ResourceGateway,
    identity: Arc<dyn SessionIdentity>,
}

impl App {
    /// Assemble an App from explicit collaborators.
    pub fn new(parts: AppParts) -> Self {
        Self {
            documents: RepositoryDocumentCache::new(parts.document_source, parts.session_cache),
            gateway: ResourceGateway::new(
                parts.storage,
                PathResolver::new(parts.addressing),
                parts.root_base,
            ),
            identity: parts.identity,
        }
    }

    /// Read configuration and build the local filesystem collaborators it
    /// describes.
    pub fn from_config(ctx: AppContext) -> Result<Self> {
        let config_result = read_config(&ctx.config_source)?;
        for warning in &config_result.warnings {
            warn!("{}", warning);
        }
        Ok(Self::from_config_helper(&ConfigHelper::new(config_result.config)))
    }

    /// Build the collaborators described by an already-loaded configuration.
    pub fn from_config_helper(config: &ConfigHelper) -> Self {
        let document_source: Arc<dyn DocumentSource> = match config.document_path() {
            Some(path) => Arc::new(FsDocumentSource::new(path)),
            None => Arc::new(ScanDocumentSource::new(config.solution_root())),
        };
        let session_cache: Arc<dyn SessionCache> = if config.caching_enabled() {
            Arc::new(MemorySessionCache::new(config.cache_capacity()))
        } else {
            Arc::new(NoopSessionCache)
        };
        debug!(
            solution_root = %config.solution_root().display(),
            caching = config.caching_enabled(),
            session = config.session_key(),
            "creating app"
        );

        let parts = AppParts::new(
            document_source,
            Arc::new(StaticSessionIdentity::new(config.session_key())),
        )
        .with_session_cache(session_cache)
        .with_storage(Arc::new(FsStorageProvider::new(config.solution_root())))
        .with_root_base(config.root_base());
        Self::new(parts)
    }

    /// List the repository below `path`, keeping only files whose name ends
    /// with `type_filter`.
    ///
    /// A blank `path` lists the whole repository. Failures are logged and
    /// produce an empty listing.
    pub async fn list_repository(
        &self,
        path: Option<&str>,
        type_filter: Option<&str>,
    ) -> Vec<RepositoryObject> {
        match self.try_list_repository(path, type_filter.unwrap_or_default()).await {
            Ok(objects) => objects,
            Err(e) => {
                error!(path = path.unwrap_or_default(), "cannot list repository: {}", e);
                Vec::new()
            }
        }
    }

    async fn try_list_repository(
        &self,
        path: Option<&str>,
        type_filter: &str,
    ) -> std::result::Result<Vec<RepositoryObject>, ListingError> {
        validate_listing_path(path)?;
        let context = match path {
            Some(p) if !p.trim().is_empty() => format!("/{}", p),
            _ => "/".to_string(),
        };

        let session = self.identity.current_session_key();
        let document = self.documents.get_document(&session).await?;
        Ok(flatten(document.as_ref(), &context, type_filter))
    }

    /// Load the content of the resource named by `identifier`.
    pub async fn load_resource(&self, identifier: Option<&str>) -> ResourceResponse {
        let resolved = match self.gateway.resolver().resolve(identifier) {
            Ok(resolved) => resolved,
            Err(e) => return server_error("load", e.into()),
        };
        match self.gateway.load(&resolved).await {
            Ok(loaded) => ResourceResponse::Content {
                body: loaded.content,
                content_length: loaded.content_length,
            },
            Err(GatewayError::NotFound(address)) => {
                debug!(%address, "resource not found");
                ResourceResponse::NotFound
            }
            Err(e) => server_error("load", e),
        }
    }

    /// Create or replace the resource named by `identifier`.
    pub async fn save_resource(&self, identifier: Option<&str>, content: Bytes) -> ResourceResponse {
        let resolved = match self.gateway.resolver().resolve(identifier) {
            Ok(resolved) => resolved,
            Err(e) => return server_error("save", e.into()),
        };
        match self.gateway.save(&resolved, content).await {
            Ok(()) => ResourceResponse::Ok,
            Err(e) => server_error("save", e),
        }
    }

    /// Deleting resources is not supported; this always reports a server error.
    pub async fn delete_resource(&self, identifier: Option<&str>) -> ResourceResponse {
        let resolved = match self.gateway.resolver().resolve(identifier) {
            Ok(resolved) => resolved,
            Err(e) => return server_error("delete", e.into()),
        };
        match self.gateway.delete(&resolved).await {
            Ok(()) => ResourceResponse::Ok,
            Err(e) => server_error("delete", e),
        }
    }
}

fn server_error(operation: &str, e: GatewayError) -> ResourceResponse {
    error!(operation, "{}", e);
    ResourceResponse::ServerError
}
