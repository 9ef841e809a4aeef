use crate::ids::{generate_batch_id, BatchId, IdGenerator};
use crate::traits::{BatchStore, StorageError, StorageResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use filedrop_core::{
    is_valid_filename, BatchFileEntry, BatchListing, CandidateFile, PartialUploadPolicy,
};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Batch store backed by a directory on the local filesystem.
#[derive(Clone)]
pub struct LocalBatchStore {
    root: PathBuf,
    partial_upload_policy: PartialUploadPolicy,
    id_generator: IdGenerator,
}

impl LocalBatchStore {
    /// Create a store rooted at `root`, creating the directory if needed.
    pub async fn new(
        root: impl Into<PathBuf>,
        partial_upload_policy: PartialUploadPolicy,
    ) -> StorageResult<Self> {
        let root = root.into();

        fs::create_dir_all(&root).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                root.display(),
                e
            ))
        })?;

        Ok(LocalBatchStore {
            root,
            partial_upload_policy,
            id_generator: Arc::new(generate_batch_id),
        })
    }

    /// Replace the source of candidate ids.
    pub fn with_id_generator(mut self, id_generator: IdGenerator) -> Self {
        self.id_generator = id_generator;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn batch_dir(&self, id: &BatchId) -> PathBuf {
        self.root.join(id.as_str())
    }

    async fn write_file(&self, dir: &Path, file: &CandidateFile) -> StorageResult<()> {
        if !is_valid_filename(&file.file_name) {
            return Err(StorageError::InvalidKey(format!(
                "Invalid file name: {:?}",
                file.file_name
            )));
        }

        let path = dir.join(&file.file_name);

        let mut handle = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        handle.write_all(&file.data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        handle.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        Ok(())
    }

    async fn list_files(&self, dir: &Path, batch_id: &str) -> Vec<BatchFileEntry> {
        let mut entries = match fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(batch_id = %batch_id, error = %e, "Failed to read batch directory");
                return Vec::new();
            }
        };

        let mut files = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(batch_id = %batch_id, error = %e, "Batch directory listing interrupted");
                    break;
                }
            };

            let name = entry.file_name().to_string_lossy().into_owned();
            let size_bytes = match entry.metadata().await {
                Ok(metadata) if metadata.is_file() => Some(metadata.len()),
                Ok(_) => continue,
                Err(e) => {
                    tracing::warn!(batch_id = %batch_id, file_name = %name, error = %e, "Failed to stat file");
                    None
                }
            };

            files.push(BatchFileEntry::new(name, size_bytes));
        }

        files.sort_by(|a, b| a.name.cmp(&b.name));
        files
    }

    /// Listing entry for one batch directory. Errors degrade this entry only.
    async fn describe_batch(&self, dir: &Path, id: String) -> BatchListing {
        let modified_at = match fs::metadata(dir).await {
            Ok(metadata) => metadata.modified().ok().map(DateTime::<Utc>::from),
            Err(e) => {
                tracing::warn!(batch_id = %id, error = %e, "Failed to stat batch directory");
                None
            }
        };
        let files = self.list_files(dir, &id).await;

        BatchListing {
            id,
            modified_at,
            files,
        }
    }

    async fn prune_if_empty(&self, dir: &Path, batch_id: &str) {
        let mut entries = match fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(batch_id = %batch_id, error = %e, "Failed to re-read batch directory");
                return;
            }
        };

        match entries.next_entry().await {
            Ok(None) => {}
            Ok(Some(_)) => return,
            Err(e) => {
                tracing::warn!(batch_id = %batch_id, error = %e, "Failed to re-read batch directory");
                return;
            }
        }

        // remove_dir rather than remove_dir_all: a file landing in between stays.
        match fs::remove_dir(dir).await {
            Ok(()) => tracing::info!(batch_id = %batch_id, "Removed empty batch directory"),
            Err(e) => {
                tracing::warn!(batch_id = %batch_id, error = %e, "Failed to remove empty batch directory")
            }
        }
    }
}

/// Most recent first; batches without a readable mtime go last, ties by id.
pub(crate) fn sort_batches(batches: &mut [BatchListing]) {
    batches.sort_by(|a, b| {
        b.modified_at
            .cmp(&a.modified_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

#[async_trait]
impl BatchStore for LocalBatchStore {
    async fn allocate_id(&self) -> StorageResult<BatchId> {
        let mut attempts = 0usize;

        loop {
            attempts += 1;
            let id = BatchId::parse(&(self.id_generator)())?;

            match fs::create_dir(self.batch_dir(&id)).await {
                Ok(()) => {
                    tracing::debug!(batch_id = %id, attempts = attempts, "Allocated batch id");
                    return Ok(id);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    tracing::debug!(batch_id = %id, "Batch id already taken, retrying");
                }
                Err(e) => {
                    return Err(StorageError::AllocationFailed(format!(
                        "Failed to create batch directory {}: {}",
                        self.batch_dir(&id).display(),
                        e
                    )));
                }
            }
        }
    }

    async fn place_batch(&self, id: &BatchId, files: &[CandidateFile]) -> StorageResult<usize> {
        let dir = self.batch_dir(id);
        let start = Instant::now();

        fs::create_dir_all(&dir).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to create batch directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        for (written, file) in files.iter().enumerate() {
            if let Err(err) = self.write_file(&dir, file).await {
                tracing::error!(
                    batch_id = %id,
                    file_name = %file.file_name,
                    written = written,
                    error = %err,
                    "Batch placement failed"
                );

                if self.partial_upload_policy == PartialUploadPolicy::Rollback {
                    match fs::remove_dir_all(&dir).await {
                        Ok(()) => tracing::info!(batch_id = %id, "Rolled back partial batch"),
                        Err(e) => tracing::warn!(
                            batch_id = %id,
                            error = %e,
                            "Failed to roll back partial batch"
                        ),
                    }
                }

                return Err(err);
            }

            tracing::debug!(
                batch_id = %id,
                file_name = %file.file_name,
                size_bytes = file.size(),
                "Stored file"
            );
        }

        tracing::info!(
            batch_id = %id,
            file_count = files.len(),
            size_bytes = files.iter().map(CandidateFile::size).sum::<u64>(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Batch stored"
        );

        Ok(files.len())
    }

    async fn list_batches(&self) -> StorageResult<Vec<BatchListing>> {
        let mut entries = fs::read_dir(&self.root).await.map_err(|e| {
            StorageError::ListFailed(format!(
                "Failed to read storage root {}: {}",
                self.root.display(),
                e
            ))
        })?;

        let mut batches = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            StorageError::ListFailed(format!(
                "Failed to read storage root {}: {}",
                self.root.display(),
                e
            ))
        })? {
            let is_dir = match entry.file_type().await {
                Ok(file_type) => file_type.is_dir(),
                Err(e) => {
                    tracing::warn!(path = %entry.path().display(), error = %e, "Failed to read storage entry type");
                    continue;
                }
            };
            if !is_dir {
                continue;
            }

            let id = entry.file_name().to_string_lossy().into_owned();
            batches.push(self.describe_batch(&entry.path(), id).await);
        }

        sort_batches(&mut batches);
        Ok(batches)
    }

    async fn remove_batch(&self, id: &str) {
        let id = match BatchId::parse(id) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(batch_id = %id, error = %e, "Refusing to remove batch");
                return;
            }
        };

        match fs::remove_dir_all(self.batch_dir(&id)).await {
            Ok(()) => tracing::info!(batch_id = %id, "Removed batch"),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(batch_id = %id, "Batch already gone")
            }
            Err(e) => tracing::error!(batch_id = %id, error = %e, "Failed to remove batch"),
        }
    }

    async fn remove_file(&self, id: &str, file_name: &str) {
        let id = match BatchId::parse(id) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(batch_id = %id, error = %e, "Refusing to remove file");
                return;
            }
        };
        if !is_valid_filename(file_name) {
            tracing::warn!(batch_id = %id, file_name = %file_name, "Refusing to remove file with invalid name");
            return;
        }

        let dir = self.batch_dir(&id);
        match fs::remove_file(dir.join(file_name)).await {
            Ok(()) => tracing::info!(batch_id = %id, file_name = %file_name, "Removed file"),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(batch_id = %id, file_name = %file_name, "File already gone")
            }
            Err(e) => {
                tracing::error!(batch_id = %id, file_name = %file_name, error = %e, "Failed to remove file")
            }
        }

        self.prune_if_empty(&dir, id.as_str()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, SystemTime};
    use tempfile::tempdir;

    fn candidate(name: &str, data: &[u8]) -> CandidateFile {
        CandidateFile::new(name, "text/plain", Bytes::copy_from_slice(data))
    }

    async fn store(root: &Path) -> LocalBatchStore {
        LocalBatchStore::new(root, PartialUploadPolicy::Keep)
            .await
            .unwrap()
    }

    fn set_mtime(path: &Path, secs_ago: u64) {
        let when = SystemTime::now() - Duration::from_secs(secs_ago);
        std::fs::File::open(path)
            .unwrap()
            .set_modified(when)
            .unwrap();
    }

    #[tokio::test]
    async fn test_new_creates_missing_root() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("nested").join("uploads");
        let store = store(&root).await;
        assert!(store.root().is_dir());
    }

    #[tokio::test]
    async fn test_allocate_creates_directory() {
        let dir = tempdir().unwrap();
        let store = store(dir.path()).await;

        let id = store.allocate_id().await.unwrap();
        assert_eq!(id.as_str().len(), 8);
        assert!(dir.path().join(id.as_str()).is_dir());
    }

    #[tokio::test]
    async fn test_allocate_retries_on_collision() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("aaaaaaaa")).unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let generator: IdGenerator = Arc::new(move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                "aaaaaaaa".to_string()
            } else {
                "bbbbbbbb".to_string()
            }
        });
        let store = store(dir.path()).await.with_id_generator(generator);

        let id = store.allocate_id().await.unwrap();
        assert_eq!(id.as_str(), "bbbbbbbb");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_allocate_rejects_unsafe_generated_id() {
        let dir = tempdir().unwrap();
        let store = store(dir.path())
            .await
            .with_id_generator(Arc::new(|| "../x".to_string()));

        assert!(matches!(
            store.allocate_id().await,
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn test_place_batch_writes_files() {
        let dir = tempdir().unwrap();
        let store = store(dir.path()).await;
        let id = store.allocate_id().await.unwrap();

        let written = store
            .place_batch(&id, &[candidate("a.txt", b"hello"), candidate("b.txt", b"!")])
            .await
            .unwrap();

        assert_eq!(written, 2);
        let batch_dir = dir.path().join(id.as_str());
        assert_eq!(std::fs::read(batch_dir.join("a.txt")).unwrap(), b"hello");
        assert_eq!(std::fs::read(batch_dir.join("b.txt")).unwrap(), b"!");
    }

    #[tokio::test]
    async fn test_place_batch_keeps_partial_files_by_default() {
        let dir = tempdir().unwrap();
        let store = store(dir.path()).await;
        let id = store.allocate_id().await.unwrap();

        let result = store
            .place_batch(&id, &[candidate("a.txt", b"1"), candidate("..", b"2")])
            .await;

        assert!(result.is_err());
        assert!(dir.path().join(id.as_str()).join("a.txt").is_file());
    }

    #[tokio::test]
    async fn test_place_batch_rollback_removes_directory() {
        let dir = tempdir().unwrap();
        let store = LocalBatchStore::new(dir.path(), PartialUploadPolicy::Rollback)
            .await
            .unwrap();
        let id = store.allocate_id().await.unwrap();

        let result = store
            .place_batch(&id, &[candidate("a.txt", b"1"), candidate("..", b"2")])
            .await;

        assert!(result.is_err());
        assert!(!dir.path().join(id.as_str()).exists());
    }

    #[tokio::test]
    async fn test_list_empty_root() {
        let dir = tempdir().unwrap();
        let store = store(dir.path()).await;
        assert!(store.list_batches().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_missing_root_is_error() {
        let dir = tempdir().unwrap();
        let store = store(&dir.path().join("uploads")).await;
        std::fs::remove_dir(dir.path().join("uploads")).unwrap();

        assert!(matches!(
            store.list_batches().await,
            Err(StorageError::ListFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_list_sorts_by_mtime_desc_and_files_by_name() {
        let dir = tempdir().unwrap();
        let store = store(dir.path()).await;

        for (id, files, secs_ago) in [
            ("oldbatch", vec!["z.txt", "a.txt"], 300),
            ("newbatch", vec!["m.txt"], 10),
            ("midbatch", vec![], 100),
        ] {
            let batch = dir.path().join(id);
            std::fs::create_dir(&batch).unwrap();
            for name in files {
                std::fs::write(batch.join(name), vec![0u8; 1536]).unwrap();
            }
            set_mtime(&batch, secs_ago);
        }
        std::fs::write(dir.path().join("stray.txt"), b"not a batch").unwrap();

        let batches = store.list_batches().await.unwrap();
        let ids: Vec<_> = batches.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["newbatch", "midbatch", "oldbatch"]);

        let old = &batches[2];
        let names: Vec<_> = old.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "z.txt"]);
        assert_eq!(old.files[0].size_bytes, Some(1536));
        assert_eq!(old.files[0].size, "1.5 KiB");

        assert!(batches[1].files.is_empty());
    }

    #[tokio::test]
    async fn test_vanished_batch_degrades_to_empty_entry() {
        let dir = tempdir().unwrap();
        let store = store(dir.path()).await;

        let listing = store
            .describe_batch(&dir.path().join("deadbeef"), "deadbeef".to_string())
            .await;
        assert_eq!(listing.id, "deadbeef");
        assert_eq!(listing.modified_at, None);
        assert!(listing.files.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unreadable_batch_is_listed_alongside_readable_ones() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let store = store(dir.path()).await;

        let open = dir.path().join("openbtch");
        let locked = dir.path().join("lockedbt");
        for batch in [&open, &locked] {
            std::fs::create_dir(batch).unwrap();
            std::fs::write(batch.join("a.txt"), b"data").unwrap();
        }
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

        // Privileged users read through the mode bits
        let enforced = std::fs::read_dir(&locked).is_err();
        let batches = store.list_batches().await.unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(batches.len(), 2);
        let open_entry = batches.iter().find(|b| b.id == "openbtch").unwrap();
        assert_eq!(open_entry.files.len(), 1);
        let locked_entry = batches.iter().find(|b| b.id == "lockedbt").unwrap();
        if enforced {
            assert!(locked_entry.files.is_empty());
        }
    }

    #[test]
    fn test_sort_batches_ties_by_id_and_unknown_mtime_last() {
        let now = Utc::now();
        let mut batches = vec![
            BatchListing {
                id: "c".to_string(),
                modified_at: None,
                files: vec![],
            },
            BatchListing {
                id: "b".to_string(),
                modified_at: Some(now),
                files: vec![],
            },
            BatchListing {
                id: "a".to_string(),
                modified_at: Some(now),
                files: vec![],
            },
        ];

        sort_batches(&mut batches);
        let ids: Vec<_> = batches.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_remove_batch() {
        let dir = tempdir().unwrap();
        let store = store(dir.path()).await;
        let id = store.allocate_id().await.unwrap();
        store
            .place_batch(&id, &[candidate("a.txt", b"1")])
            .await
            .unwrap();

        store.remove_batch(id.as_str()).await;
        assert!(!dir.path().join(id.as_str()).exists());

        // Second removal is a no-op.
        store.remove_batch(id.as_str()).await;
    }

    #[tokio::test]
    async fn test_remove_file_prunes_empty_batch() {
        let dir = tempdir().unwrap();
        let store = store(dir.path()).await;
        let id = store.allocate_id().await.unwrap();
        store
            .place_batch(&id, &[candidate("a.txt", b"1"), candidate("b.txt", b"2")])
            .await
            .unwrap();
        let batch_dir = dir.path().join(id.as_str());

        store.remove_file(id.as_str(), "a.txt").await;
        assert!(!batch_dir.join("a.txt").exists());
        assert!(batch_dir.join("b.txt").exists());

        store.remove_file(id.as_str(), "b.txt").await;
        assert!(!batch_dir.exists());
    }

    #[tokio::test]
    async fn test_remove_refuses_traversal() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("uploads");
        let store = store(&root).await;
        let outside = dir.path().join("keep.txt");
        std::fs::write(&outside, b"precious").unwrap();

        store.remove_batch("..").await;
        store.remove_file("..", "keep.txt").await;
        store.remove_file("abc", "../../keep.txt").await;

        assert!(outside.exists());
        assert!(root.is_dir());
    }
}
