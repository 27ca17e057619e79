use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use super::storage_provider::{
    address_segments, normalize_address, HandleIntent, ResourceHandle, Result, StorageError,
    StorageProvider,
};

/// An in-memory implementation of `StorageProvider`, intended primarily for testing.
///
/// Every trait call is counted so tests can assert that a request never
/// reached storage.
pub struct MemoryStorageProvider {
    files: RwLock<HashMap<String, Vec<u8>>>,
    directories: RwLock<HashSet<String>>,
    calls: AtomicUsize,
}

impl MemoryStorageProvider {
    /// Create a provider holding only the repository root directory.
    pub fn new() -> Self {
        let mut directories = HashSet::new();
        directories.insert(String::new());
        Self {
            files: RwLock::new(HashMap::new()),
            directories: RwLock::new(directories),
            calls: AtomicUsize::new(0),
        }
    }

    /// Add a directory and all of its ancestors.
    pub fn with_directory(self, address: &str) -> Self {
        self.add_directories(address);
        self
    }

    /// Add a file, creating its ancestor directories.
    pub fn with_file(self, address: &str, content: impl Into<Vec<u8>>) -> Self {
        let segments: Vec<&str> = address.split('/').filter(|s| !s.is_empty()).collect();
        if let Some((_, parents)) = segments.split_last() {
            self.add_directories(&parents.join("/"));
        }
        self.files
            .write()
            .unwrap()
            .insert(segments.join("/"), content.into());
        self
    }

    /// Current content of a file.
    pub fn file(&self, address: &str) -> Option<Vec<u8>> {
        self.files.read().unwrap().get(address).cloned()
    }

    /// Number of `StorageProvider` calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn add_directories(&self, address: &str) {
        let mut directories = self.directories.write().unwrap();
        let mut current = String::new();
        for segment in address.split('/').filter(|s| !s.is_empty()) {
            if !current.is_empty() {
                current.push('/');
            }
            current.push_str(segment);
            directories.insert(current.clone());
        }
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl Default for MemoryStorageProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageProvider for MemoryStorageProvider {
    async fn exists(&self, address: &str) -> Result<bool> {
        self.record_call();
        let address = normalize_address(address)?;
        Ok(self.files.read().unwrap().contains_key(&address)
            || self.directories.read().unwrap().contains(&address))
    }

    async fn read_as_string(&self, address: &str) -> Result<Option<String>> {
        self.record_call();
        let address = normalize_address(address)?;
        let files = self.files.read().unwrap();
        Ok(files
            .get(&address)
            .map(|content| String::from_utf8_lossy(content).into_owned()))
    }

    async fn get_handle(
        &self,
        address: &str,
        intent: HandleIntent,
    ) -> Result<Option<ResourceHandle>> {
        self.record_call();
        let address = normalize_address(address)?;
        let is_directory = if self.files.read().unwrap().contains_key(&address) {
            if intent == HandleIntent::Create {
                return Ok(None);
            }
            false
        } else if self.directories.read().unwrap().contains(&address) {
            true
        } else {
            return Ok(None);
        };
        Ok(Some(ResourceHandle {
            address,
            intent,
            is_directory,
        }))
    }

    async fn publish(
        &self,
        _root_base: &str,
        parent_address: &str,
        leaf_name: &str,
        content: &[u8],
        overwrite: bool,
    ) -> Result<()> {
        self.record_call();
        let mut segments = address_segments(parent_address)?;
        let parent = segments.join("/");
        if !self.directories.read().unwrap().contains(&parent) {
            return Err(StorageError::NotFound(parent));
        }

        segments.extend(address_segments(leaf_name)?);
        let address = segments.join("/");
        if self.directories.read().unwrap().contains(&address) {
            return Err(StorageError::InvalidAddress(address));
        }

        let mut files = self.files.write().unwrap();
        if !overwrite && files.contains_key(&address) {
            return Err(StorageError::AlreadyExists(address));
        }
        files.insert(address, content.to_vec());
        Ok(())
    }
}
