//! Repository implementations.
//!
//! [`FsRepository`] maps a local directory tree to VFS resources for the
//! CLI. [`MemoryRepository`] is an in-memory double with per-root failure
//! injection, used by tests and anywhere a canned corpus is convenient.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use uuid::Uuid;
use vfsearch_core::{ReadError, Repository, ResourceFilter, ResourceRecord, VfsResource};

/// Resource type id assigned to plain files by [`FsRepository`].
pub const TYPE_PLAIN: u32 = 1;

/// Namespace for deriving stable resource ids from paths.
const ID_NAMESPACE: Uuid = Uuid::NAMESPACE_URL;

// ============================================================================
// Filesystem repository
// ============================================================================

/// Repository reading resources from a local directory tree.
///
/// Resource ids are derived from the canonical path so repeated listings
/// of an unchanged tree produce identical records.
pub struct FsRepository {
    root: PathBuf,
}

impl FsRepository {
    /// Create a repository over `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn record_for(path: &Path, is_folder: bool) -> ResourceRecord {
        ResourceRecord::Vfs(VfsResource {
            id: Uuid::new_v5(&ID_NAMESPACE, path.display().to_string().as_bytes()),
            path: path.to_path_buf(),
            type_id: TYPE_PLAIN,
            is_folder,
            released: None,
            expires: None,
        })
    }

    fn walk(dir: &Path, filter: &ResourceFilter, out: &mut Vec<ResourceRecord>) -> std::io::Result<()> {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            // Hidden entries are not content
            if path
                .file_name()
                .is_some_and(|n| n.to_string_lossy().starts_with('.'))
            {
                continue;
            }
            if path.is_dir() {
                if !filter.files_only {
                    out.push(Self::record_for(&path, true));
                }
                Self::walk(&path, filter, out)?;
            } else if path.is_file() {
                out.push(Self::record_for(&path, false));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Repository for FsRepository {
    async fn read_resource(&self, path: &Path) -> Result<ResourceRecord, ReadError> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|_| ReadError::NotFound(path.to_path_buf()))?;
        Ok(Self::record_for(path, metadata.is_dir()))
    }

    async fn list_resources(
        &self,
        path: &Path,
        filter: &ResourceFilter,
    ) -> Result<Vec<ResourceRecord>, ReadError> {
        if !path.starts_with(&self.root) && path != self.root {
            return Err(ReadError::NotFound(path.to_path_buf()));
        }
        let path = path.to_path_buf();
        let filter = *filter;
        // Directory walking is blocking I/O
        let mut listing = tokio::task::spawn_blocking(move || {
            let mut out = Vec::new();
            Self::walk(&path, &filter, &mut out).map(|()| out)
        })
        .await
        .map_err(|e| ReadError::Unreachable(format!("listing task failed: {e}")))?
        .map_err(ReadError::Io)?;

        listing.sort_by_key(ResourceRecord::path);
        Ok(listing)
    }
}

// ============================================================================
// In-memory repository
// ============================================================================

/// In-memory repository double.
///
/// Holds records of either backing model, honors release/expiry windows,
/// and can be told to fail reads under specific roots.
#[derive(Default)]
pub struct MemoryRepository {
    resources: RwLock<HashMap<PathBuf, ResourceRecord>>,
    failing_roots: RwLock<Vec<PathBuf>>,
}

impl MemoryRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record under its canonical path.
    pub fn insert(&self, record: ResourceRecord) {
        if let Ok(mut resources) = self.resources.write() {
            resources.insert(record.path(), record);
        }
    }

    /// Remove the record under `path`.
    pub fn remove(&self, path: &Path) {
        if let Ok(mut resources) = self.resources.write() {
            resources.remove(path);
        }
    }

    /// Make every read under `root` fail with [`ReadError::Unreachable`].
    pub fn fail_under(&self, root: impl Into<PathBuf>) {
        if let Ok(mut roots) = self.failing_roots.write() {
            roots.push(root.into());
        }
    }

    fn check_reachable(&self, path: &Path) -> Result<(), ReadError> {
        let failing = self
            .failing_roots
            .read()
            .map_err(|_| ReadError::Unreachable("repository lock poisoned".to_string()))?;
        if failing.iter().any(|root| path.starts_with(root)) {
            return Err(ReadError::Unreachable(format!(
                "simulated failure under {}",
                path.display()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn read_resource(&self, path: &Path) -> Result<ResourceRecord, ReadError> {
        self.check_reachable(path)?;
        let resources = self
            .resources
            .read()
            .map_err(|_| ReadError::Unreachable("repository lock poisoned".to_string()))?;
        resources
            .get(path)
            .cloned()
            .ok_or_else(|| ReadError::NotFound(path.to_path_buf()))
    }

    async fn list_resources(
        &self,
        path: &Path,
        filter: &ResourceFilter,
    ) -> Result<Vec<ResourceRecord>, ReadError> {
        self.check_reachable(path)?;
        let now = Utc::now();
        let resources = self
            .resources
            .read()
            .map_err(|_| ReadError::Unreachable("repository lock poisoned".to_string()))?;

        let mut listing: Vec<ResourceRecord> = resources
            .values()
            .filter(|r| r.path().starts_with(path) && r.path() != path)
            .filter(|r| !filter.files_only || r.is_file())
            .filter(|r| filter.include_expired || r.is_available(now))
            .cloned()
            .collect();

        listing.sort_by_key(ResourceRecord::path);
        Ok(listing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::tempdir;

    fn vfs(path: &str) -> ResourceRecord {
        ResourceRecord::Vfs(VfsResource {
            id: Uuid::new_v4(),
            path: PathBuf::from(path),
            type_id: TYPE_PLAIN,
            is_folder: false,
            released: None,
            expires: None,
        })
    }

    // ==================== FsRepository Tests ====================

    #[tokio::test]
    async fn test_fs_listing_is_recursive_sorted_and_files_only() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("b.txt"), "b").unwrap();
        std::fs::write(dir.path().join("a.txt"), "a").unwrap();
        std::fs::write(dir.path().join("sub/c.txt"), "c").unwrap();
        std::fs::write(dir.path().join(".hidden"), "x").unwrap();

        let repo = FsRepository::new(dir.path());
        let listing = repo
            .list_resources(dir.path(), &ResourceFilter::files_ignore_expiration())
            .await
            .unwrap();

        let names: Vec<String> = listing.iter().map(ResourceRecord::name).collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "c.txt"]);
        assert!(listing.iter().all(ResourceRecord::is_file));
    }

    #[tokio::test]
    async fn test_fs_ids_are_stable_across_listings() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "a").unwrap();

        let repo = FsRepository::new(dir.path());
        let filter = ResourceFilter::files_ignore_expiration();
        let first = repo.list_resources(dir.path(), &filter).await.unwrap();
        let second = repo.list_resources(dir.path(), &filter).await.unwrap();
        assert_eq!(first[0].id(), second[0].id());
    }

    #[tokio::test]
    async fn test_fs_read_missing_resource() {
        let dir = tempdir().unwrap();
        let repo = FsRepository::new(dir.path());
        let result = repo.read_resource(&dir.path().join("missing.txt")).await;
        assert!(matches!(result, Err(ReadError::NotFound(_))));
    }

    // ==================== MemoryRepository Tests ====================

    #[tokio::test]
    async fn test_memory_listing_scoped_to_subtree() {
        let repo = MemoryRepository::new();
        repo.insert(vfs("/site/a.txt"));
        repo.insert(vfs("/site/sub/b.txt"));
        repo.insert(vfs("/other/c.txt"));

        let listing = repo
            .list_resources(Path::new("/site"), &ResourceFilter::files_ignore_expiration())
            .await
            .unwrap();
        assert_eq!(listing.len(), 2);
    }

    #[tokio::test]
    async fn test_memory_expiry_window_filtering() {
        let repo = MemoryRepository::new();
        let expired = ResourceRecord::Vfs(VfsResource {
            id: Uuid::new_v4(),
            path: PathBuf::from("/site/old.txt"),
            type_id: TYPE_PLAIN,
            is_folder: false,
            released: None,
            expires: Some(Utc::now() - Duration::hours(1)),
        });
        repo.insert(expired);
        repo.insert(vfs("/site/new.txt"));

        let current = repo
            .list_resources(Path::new("/site"), &ResourceFilter::files())
            .await
            .unwrap();
        assert_eq!(current.len(), 1);

        // Full rebuilds ignore the window
        let all = repo
            .list_resources(Path::new("/site"), &ResourceFilter::files_ignore_expiration())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_memory_failure_injection() {
        let repo = MemoryRepository::new();
        repo.insert(vfs("/site/a.txt"));
        repo.fail_under("/site");

        assert!(matches!(
            repo.read_resource(Path::new("/site/a.txt")).await,
            Err(ReadError::Unreachable(_))
        ));
        assert!(matches!(
            repo.list_resources(Path::new("/site"), &ResourceFilter::files())
                .await,
            Err(ReadError::Unreachable(_))
        ));
    }
}
