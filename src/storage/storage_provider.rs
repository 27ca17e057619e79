use async_trait::async_trait;
use thiserror::Error;

/// Errors reported by storage providers.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// What a caller intends to do with a resource handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleIntent {
    /// Create new resources inside the addressed directory.
    Create,
    /// Replace the content of the addressed resource.
    Update,
}

/// A handle to an existing resource or directory, granted for an intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceHandle {
    pub address: String,
    pub intent: HandleIntent,
    pub is_directory: bool,
}

/// The storage interface resources are read from and published to.
///
/// Addresses are solution-relative, `/`-separated and carry no leading slash;
/// the empty address is the repository root.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Check whether a resource or directory exists at `address`.
    async fn exists(&self, address: &str) -> Result<bool>;

    /// Read a resource as text. Returns `None` when there is no readable
    /// content at `address`.
    ///
    /// Bytes are decoded as UTF-8; invalid sequences become U+FFFD rather
    /// than an error, so every stored file can be loaded.
    async fn read_as_string(&self, address: &str) -> Result<Option<String>>;

    /// Get a handle for `intent`, or `None` if none can be granted.
    ///
    /// A `Create` handle is only granted on an existing directory; an
    /// `Update` handle on anything that exists.
    async fn get_handle(&self, address: &str, intent: HandleIntent)
        -> Result<Option<ResourceHandle>>;

    /// Write `content` as `leaf_name` inside `parent_address` below `root_base`.
    ///
    /// `parent_address` may carry a leading `/`. When `overwrite` is false an
    /// existing resource is left untouched and an error is returned.
    async fn publish(
        &self,
        root_base: &str,
        parent_address: &str,
        leaf_name: &str,
        content: &[u8],
        overwrite: bool,
    ) -> Result<()>;
}

/// Split an address into its non-empty segments, rejecting traversal.
pub(crate) fn address_segments(address: &str) -> Result<Vec<&str>> {
    let segments: Vec<&str> = address.split('/').filter(|s| !s.is_empty()).collect();
    if segments.iter().any(|s| *s == "." || *s == "..") {
        return Err(StorageError::InvalidAddress(address.to_string()));
    }
    Ok(segments)
}

/// Canonical form of an address: segments joined by single `/`.
pub(crate) fn normalize_address(address: &str) -> Result<String> {
    Ok(address_segments(address)?.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_address() {
        assert_eq!(normalize_address("/soln//sub/").unwrap(), "soln/sub");
        assert_eq!(normalize_address("").unwrap(), "");
    }

    #[test]
    fn test_traversal_is_rejected() {
        assert!(matches!(
            normalize_address("soln/../../etc"),
            Err(StorageError::InvalidAddress(_))
        ));
        assert!(normalize_address("soln/./x").is_err());
    }
}
