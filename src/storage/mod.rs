//! Request-scoped transient storage for uploaded AOI files.
//!
//! Every upload is written to its own file and removed once the request has
//! been answered. [`TransientFile`] owns that file: callers release it
//! explicitly, and dropping an unreleased guard removes the file
//! synchronously so aborted or panicking requests leave nothing behind.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

/// Backend holding transient copies of uploaded files.
#[async_trait]
pub trait TransientStorage: Send + Sync {
    /// Write `bytes` to a new, uniquely named location and return its path.
    async fn persist(&self, bytes: &[u8]) -> io::Result<PathBuf>;

    /// Read a persisted file back as text.
    async fn read_text(&self, path: &Path) -> io::Result<String>;

    /// Remove a persisted file.
    async fn remove(&self, path: &Path) -> io::Result<()>;

    /// Remove a persisted file without awaiting. Used from `Drop`.
    fn remove_now(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }
}

/// Transient storage in a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct DiskStorage {
    dir: PathBuf,
}

impl DiskStorage {
    /// Open the storage directory, creating it if needed.
    pub fn open(dir: &Path) -> io::Result<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl TransientStorage for DiskStorage {
    async fn persist(&self, bytes: &[u8]) -> io::Result<PathBuf> {
        let path = self.dir.join(Uuid::new_v4().simple().to_string());
        if let Err(e) = tokio::fs::write(&path, bytes).await {
            // A partial write may have created the file.
            tokio::fs::remove_file(&path).await.ok();
            return Err(e);
        }
        Ok(path)
    }

    async fn read_text(&self, path: &Path) -> io::Result<String> {
        let bytes = tokio::fs::read(path).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn remove(&self, path: &Path) -> io::Result<()> {
        tokio::fs::remove_file(path).await
    }
}

/// A persisted upload that is removed exactly once.
pub struct TransientFile {
    storage: Arc<dyn TransientStorage>,
    path: PathBuf,
    released: bool,
}

impl TransientFile {
    /// Persist `bytes` and take ownership of the resulting file.
    pub async fn create(storage: Arc<dyn TransientStorage>, bytes: &[u8]) -> io::Result<Self> {
        let path = storage.persist(bytes).await?;
        tracing::debug!(path = %path.display(), size = bytes.len(), "Persisted transient AOI file");
        Ok(Self {
            storage,
            path,
            released: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn read_text(&self) -> io::Result<String> {
        self.storage.read_text(&self.path).await
    }

    /// Remove the file. Failures are logged and never returned.
    pub async fn release(mut self) {
        let result = self.storage.remove(&self.path).await;
        self.released = true;
        match result {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "Removed transient AOI file")
            }
            Err(e) => tracing::error!(
                path = %self.path.display(),
                "Error deleting the transient AOI file: {}",
                e
            ),
        }
    }
}

impl Drop for TransientFile {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        match self.storage.remove_now(&self.path) {
            Ok(()) => tracing::warn!(
                path = %self.path.display(),
                "Transient AOI file removed after an interrupted request"
            ),
            Err(e) => tracing::error!(
                path = %self.path.display(),
                "Error deleting the transient AOI file: {}",
                e
            ),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Storage doubles for exercising fault paths.

    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Disk storage with injectable write, read and delete failures.
    pub struct FaultyStorage {
        pub inner: DiskStorage,
        pub fail_persist: bool,
        pub fail_read: bool,
        pub fail_remove: bool,
        removals: AtomicUsize,
    }

    impl FaultyStorage {
        pub fn new(inner: DiskStorage) -> Self {
            Self {
                inner,
                fail_persist: false,
                fail_read: false,
                fail_remove: false,
                removals: AtomicUsize::new(0),
            }
        }

        pub fn failing_persist(mut self) -> Self {
            self.fail_persist = true;
            self
        }

        pub fn failing_read(mut self) -> Self {
            self.fail_read = true;
            self
        }

        pub fn failing_remove(mut self) -> Self {
            self.fail_remove = true;
            self
        }

        /// Number of removal attempts, async or synchronous.
        pub fn removals(&self) -> usize {
            self.removals.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TransientStorage for FaultyStorage {
        async fn persist(&self, bytes: &[u8]) -> io::Result<PathBuf> {
            if self.fail_persist {
                return Err(io::Error::other("simulated write failure"));
            }
            self.inner.persist(bytes).await
        }

        async fn read_text(&self, path: &Path) -> io::Result<String> {
            if self.fail_read {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "simulated read failure"));
            }
            self.inner.read_text(path).await
        }

        async fn remove(&self, path: &Path) -> io::Result<()> {
            self.removals.fetch_add(1, Ordering::SeqCst);
            if self.fail_remove {
                return Err(io::Error::other("simulated delete failure"));
            }
            self.inner.remove(path).await
        }

        fn remove_now(&self, path: &Path) -> io::Result<()> {
            self.removals.fetch_add(1, Ordering::SeqCst);
            if self.fail_remove {
                return Err(io::Error::other("simulated delete failure"));
            }
            self.inner.remove_now(path)
        }
    }
}
