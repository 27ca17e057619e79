//! Storage providers holding resource bytes.
//!
//! The core talks to storage only through [`StorageProvider`]. Two providers
//! ship with the crate: [`MemoryStorageProvider`] for tests and
//! [`FsStorageProvider`] for a solution directory on local disk.

mod fs_provider;
mod memory_provider;
mod storage_provider;

pub use fs_provider::FsStorageProvider;
pub use memory_provider::MemoryStorageProvider;
pub use storage_provider::{HandleIntent, ResourceHandle, Result, StorageError, StorageProvider};
