//! Load, save and delete of a single resource through a storage provider.

use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

use crate::path::{InvalidPathError, PathResolver, ResolvedPath};
use crate::storage::{HandleIntent, StorageError, StorageProvider};

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during resource operations.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{0}")]
    InvalidPath(#[from] InvalidPathError),

    #[error("access to repository has failed: no storage provider available")]
    ProviderUnavailable,

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("error retrieving document from solution repository: {0}")]
    Read(String),

    #[error("error occurred while saving to solution repository: {0}")]
    Persist(String),

    #[error("{0} is not supported")]
    Unsupported(&'static str),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Bytes of a loaded resource together with their exact length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedResource {
    pub content: Bytes,
    /// Length in bytes of the UTF-8 content, for an explicit content-length.
    pub content_length: usize,
}

// =============================================================================
// ResourceGateway
// =============================================================================

/// Orchestrates storage provider calls for a single resource.
///
/// The provider is optional; every operation reports
/// [`GatewayError::ProviderUnavailable`] when it is missing.
pub struct ResourceGateway {
    provider: Option<Arc<dyn StorageProvider>>,
    resolver: PathResolver,
    root_base: String,
}

impl ResourceGateway {
    /// Create a gateway publishing below `root_base`.
    pub fn new(
        provider: Option<Arc<dyn StorageProvider>>,
        resolver: PathResolver,
        root_base: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            resolver,
            root_base: root_base.into(),
        }
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    fn provider(&self) -> Result<&Arc<dyn StorageProvider>> {
        self.provider
            .as_ref()
            .ok_or(GatewayError::ProviderUnavailable)
    }

    /// Load the content of a resource.
    pub async fn load(&self, resolved: &ResolvedPath) -> Result<LoadedResource> {
        let provider = self.provider()?;
        let address = self.resolver.address(resolved);

        if !provider.exists(&address).await? {
            return Err(GatewayError::NotFound(address));
        }
        let doc = provider
            .read_as_string(&address)
            .await?
            .ok_or(GatewayError::Read(address))?;

        let content = Bytes::from(doc.into_bytes());
        Ok(LoadedResource {
            content_length: content.len(),
            content,
        })
    }

    /// Save `content` as the resource, creating or replacing it.
    ///
    /// A new resource may only be created inside an existing directory.
    pub async fn save(&self, resolved: &ResolvedPath, content: Bytes) -> Result<()> {
        let provider = self.provider()?;
        let address = self.resolver.address(resolved);
        let parent_address = self.resolver.parent_address(resolved);

        let parent = provider
            .get_handle(&parent_address, HandleIntent::Create)
            .await?;
        let file_path = if parent_address.is_empty() {
            resolved.leaf_name.clone()
        } else {
            format!("{}/{}", parent_address, resolved.leaf_name)
        };
        let existing = provider.get_handle(&address, HandleIntent::Update).await?;

        if existing.is_some() || (!provider.exists(&file_path).await? && parent.is_some()) {
            provider
                .publish(
                    &self.root_base,
                    &format!("/{}", parent_address),
                    &resolved.leaf_name,
                    &content,
                    true,
                )
                .await
                .map_err(|e| GatewayError::Persist(e.to_string()))?;
            debug!(
                container = %resolved.container,
                sub_path = %resolved.sub_path,
                leaf = %resolved.leaf_name,
                "published resource"
            );
            Ok(())
        } else {
            Err(GatewayError::Persist(format!(
                "no writable location for {}",
                address
            )))
        }
    }

    /// Delete a resource. Deletion is not supported and always fails.
    pub async fn delete(&self, _resolved: &ResolvedPath) -> Result<()> {
        Err(GatewayError::Unsupported("deleting resources"))
    }
}
