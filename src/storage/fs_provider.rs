use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::fs;

use super::storage_provider::{
    address_segments, HandleIntent, ResourceHandle, Result, StorageError, StorageProvider,
};

/// Counter for generating unique temp file names.
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Name of the directory holding in-flight writes. It starts with `.` so
/// scanned documents list it as invisible.
const TEMP_DIR_NAME: &str = ".solrepo";

/// A filesystem-based implementation of `StorageProvider`.
///
/// All addresses are relative to the solution root. Publishing is atomic:
/// data is written to a temp file in `.solrepo/` then renamed into place.
pub struct FsStorageProvider {
    root: PathBuf,
}

impl FsStorageProvider {
    /// Create a provider rooted at the given solution directory.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Resolve an address against a base directory.
    fn full_path(base: &Path, address: &str) -> Result<PathBuf> {
        let mut path = base.to_path_buf();
        for segment in address_segments(address)? {
            path.push(segment);
        }
        Ok(path)
    }

    fn temp_dir(base: &Path) -> PathBuf {
        base.join(TEMP_DIR_NAME)
    }

    /// Generate a unique temp file path.
    fn temp_file_path(base: &Path) -> PathBuf {
        let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let pid = std::process::id();
        Self::temp_dir(base).join(format!("tmp.{}.{}", pid, counter))
    }

    /// The directory publishes go to. An empty `root_base` means this
    /// provider's root; anything else must name that same root.
    fn publish_base(&self, root_base: &str) -> Result<&Path> {
        if root_base.is_empty() || Path::new(root_base) == self.root {
            Ok(&self.root)
        } else {
            Err(StorageError::InvalidAddress(format!(
                "publish base {} is outside the repository root {}",
                root_base,
                self.root.display()
            )))
        }
    }
}

async fn metadata(path: &Path) -> Result<Option<std::fs::Metadata>> {
    match fs::metadata(path).await {
        Ok(meta) => Ok(Some(meta)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl StorageProvider for FsStorageProvider {
    async fn exists(&self, address: &str) -> Result<bool> {
        let path = Self::full_path(&self.root, address)?;
        Ok(metadata(&path).await?.is_some())
    }

    async fn read_as_string(&self, address: &str) -> Result<Option<String>> {
        let path = Self::full_path(&self.root, address)?;
        match metadata(&path).await? {
            Some(meta) if meta.is_file() => {
                let bytes = fs::read(&path).await?;
                Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
            }
            _ => Ok(None),
        }
    }

    async fn get_handle(
        &self,
        address: &str,
        intent: HandleIntent,
    ) -> Result<Option<ResourceHandle>> {
        let path = Self::full_path(&self.root, address)?;
        Ok(metadata(&path)
            .await?
            .filter(|meta| intent != HandleIntent::Create || meta.is_dir())
            .map(|meta| ResourceHandle {
                address: address.to_string(),
                intent,
                is_directory: meta.is_dir(),
            }))
    }

    async fn publish(
        &self,
        root_base: &str,
        parent_address: &str,
        leaf_name: &str,
        content: &[u8],
        overwrite: bool,
    ) -> Result<()> {
        let base = self.publish_base(root_base)?;
        let parent = Self::full_path(base, parent_address)?;
        let full_path = Self::full_path(&parent, leaf_name)?;
        if full_path == parent {
            return Err(StorageError::InvalidAddress(leaf_name.to_string()));
        }

        if let Some(meta) = metadata(&full_path).await? {
            if meta.is_dir() {
                return Err(StorageError::InvalidAddress(full_path.display().to_string()));
            }
            if !overwrite {
                return Err(StorageError::AlreadyExists(full_path.display().to_string()));
            }
        }

        let temp_path = Self::temp_file_path(base);
        fs::create_dir_all(Self::temp_dir(base)).await?;

        write_via_temp(&temp_path, &parent, &full_path, content).await
    }
}

/// Write `content` to `temp_path`, then move it into place at `full_path`.
/// On failure the temp file is removed.
async fn write_via_temp(
    temp_path: &Path,
    parent: &Path,
    full_path: &Path,
    content: &[u8],
) -> Result<()> {
    let written = async {
        fs::write(temp_path, content).await?;
        fs::create_dir_all(parent).await?;
        fs::rename(temp_path, full_path).await
    }
    .await;
    if written.is_err() {
        // The temp file may or may not exist at this point.
        let _ = fs::remove_file(temp_path).await;
    }
    Ok(written?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, FsStorageProvider) {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir_all(temp_dir.path().join("soln/sub")).unwrap();
        std::fs::write(temp_dir.path().join("soln/sub/q.saiku"), "SELECT 1").unwrap();
        let provider = FsStorageProvider::new(temp_dir.path());
        (temp_dir, provider)
    }

    #[tokio::test]
    async fn test_exists_and_read() {
        let (_temp_dir, provider) = setup();

        assert!(provider.exists("soln/sub/q.saiku").await.unwrap());
        assert!(provider.exists("soln").await.unwrap());
        assert!(!provider.exists("soln/nope.saiku").await.unwrap());

        assert_eq!(
            provider.read_as_string("soln/sub/q.saiku").await.unwrap(),
            Some("SELECT 1".to_string())
        );
        assert_eq!(provider.read_as_string("soln/sub").await.unwrap(), None);
        assert_eq!(provider.read_as_string("soln/nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_rejects_traversal() {
        let (_temp_dir, provider) = setup();
        let result = provider.exists("soln/../../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidAddress(_))));
    }

    #[tokio::test]
    async fn test_handles() {
        let (_temp_dir, provider) = setup();

        let parent = provider
            .get_handle("soln/sub", HandleIntent::Create)
            .await
            .unwrap()
            .unwrap();
        assert!(parent.is_directory);

        assert!(provider
            .get_handle("soln/sub/new.saiku", HandleIntent::Update)
            .await
            .unwrap()
            .is_none());

        // Files can be updated but never serve as a parent.
        assert!(provider
            .get_handle("soln/sub/q.saiku", HandleIntent::Create)
            .await
            .unwrap()
            .is_none());
        let file = provider
            .get_handle("soln/sub/q.saiku", HandleIntent::Update)
            .await
            .unwrap()
            .unwrap();
        assert!(!file.is_directory);
    }

    #[tokio::test]
    async fn test_read_decodes_invalid_utf8_lossily() {
        let (temp_dir, provider) = setup();
        std::fs::write(temp_dir.path().join("soln/q.saiku"), b"Z\xfcrich").unwrap();

        assert_eq!(
            provider.read_as_string("soln/q.saiku").await.unwrap(),
            Some("Z\u{FFFD}rich".to_string())
        );
    }

    #[tokio::test]
    async fn test_failed_write_removes_temp_file() {
        let (temp_dir, _provider) = setup();
        let base = temp_dir.path();
        std::fs::create_dir_all(FsStorageProvider::temp_dir(base)).unwrap();
        let temp_path = FsStorageProvider::temp_file_path(base);

        // The parent lies under a regular file, so it cannot be created
        // after the temp file has been written.
        let parent = base.join("soln/sub/q.saiku/deeper");
        let full_path = parent.join("new.saiku");
        let result = write_via_temp(&temp_path, &parent, &full_path, b"SELECT 2").await;

        assert!(matches!(result, Err(StorageError::Io(_))));
        assert!(!temp_path.exists());
        let leftovers = std::fs::read_dir(FsStorageProvider::temp_dir(base))
            .unwrap()
            .count();
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn test_publish_writes_atomically() {
        let (temp_dir, provider) = setup();
        let base = temp_dir.path().to_string_lossy().into_owned();

        provider
            .publish(&base, "/soln/sub", "new.saiku", b"SELECT 2", true)
            .await
            .unwrap();
        let written = std::fs::read_to_string(temp_dir.path().join("soln/sub/new.saiku")).unwrap();
        assert_eq!(written, "SELECT 2");

        // No temp files are left behind.
        let leftovers = std::fs::read_dir(temp_dir.path().join(TEMP_DIR_NAME))
            .unwrap()
            .count();
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn test_publish_respects_overwrite_flag() {
        let (_temp_dir, provider) = setup();

        let result = provider
            .publish("", "/soln/sub", "q.saiku", b"changed", false)
            .await;
        assert!(matches!(result, Err(StorageError::AlreadyExists(_))));

        provider
            .publish("", "/soln/sub", "q.saiku", b"changed", true)
            .await
            .unwrap();
        assert_eq!(
            provider.read_as_string("soln/sub/q.saiku").await.unwrap(),
            Some("changed".to_string())
        );
    }

    #[tokio::test]
    async fn test_publish_rejects_foreign_base() {
        let (_temp_dir, provider) = setup();
        let other = TempDir::new().unwrap();
        let result = provider
            .publish(&other.path().to_string_lossy(), "/soln", "x.saiku", b"x", true)
            .await;
        assert!(matches!(result, Err(StorageError::InvalidAddress(_))));
    }
}
