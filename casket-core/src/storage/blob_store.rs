use crate::error::{CasketError, Result};
use crate::storage::atomic_writer::{AtomicWriter, TEMP_PREFIX};
use crate::storage::fingerprint::{Fingerprint, FingerprintAlgorithm, compute_fingerprint};
use crate::storage::shard::{ShardPath, is_shard_name};
use bytes::Bytes;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub root: PathBuf,
    pub algorithm: FingerprintAlgorithm,
    /// fsync payloads (and the shard directory) before reporting success
    pub sync: bool,
}

impl StoreOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            algorithm: FingerprintAlgorithm::default(),
            sync: true,
        }
    }

    pub fn algorithm(mut self, algorithm: FingerprintAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }
}

/// What startup recovery cleaned up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecoveryReport {
    pub removed_temp_files: usize,
    pub reclaimed_shards: usize,
}

/// BlobStore keeps content-addressed blobs under `<root>/<fp[0:2]>/<fp>`.
///
/// All operations are blocking filesystem calls. The store holds no locks;
/// concurrent callers are serialized only by atomic rename and unlink.
#[derive(Debug)]
pub struct BlobStore {
    root: PathBuf,
    algorithm: FingerprintAlgorithm,
    writer: AtomicWriter,
}

impl BlobStore {
    /// Open (creating if needed) a store and sweep leftovers of interrupted
    /// writes.
    pub fn open(options: StoreOptions) -> Result<Self> {
        let StoreOptions {
            root,
            algorithm,
            sync,
        } = options;

        fs::create_dir_all(&root)?;

        let store = Self {
            root,
            algorithm,
            writer: AtomicWriter::new(sync),
        };

        let report = store.recover()?;
        tracing::info!(
            "Opened blob store at {:?} (algorithm={}, sync={}, removed_temp_files={}, reclaimed_shards={})",
            store.root,
            algorithm.name(),
            sync,
            report.removed_temp_files,
            report.reclaimed_shards
        );

        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn algorithm(&self) -> FingerprintAlgorithm {
        self.algorithm
    }

    /// Store a payload and return its fingerprint. Storing a payload that is
    /// already present is a no-op.
    pub fn put(&self, payload: &[u8]) -> Result<Fingerprint> {
        let fingerprint = compute_fingerprint(self.algorithm, payload);
        let path = ShardPath::resolve(&self.root, fingerprint.as_str())?;

        if path.file_path.is_file() {
            tracing::debug!("Blob {} already exists, skipping write", fingerprint);
            return Ok(fingerprint);
        }

        self.writer.write(&path.file_path, payload)?;

        tracing::debug!("Stored blob {} ({} bytes)", fingerprint, payload.len());
        Ok(fingerprint)
    }

    pub fn get(&self, fingerprint: &str) -> Result<Bytes> {
        let path = self.resolve(fingerprint)?;

        match fs::read(&path.file_path) {
            Ok(data) => Ok(Bytes::from(data)),
            Err(error) if error.kind() == ErrorKind::NotFound => {
                Err(CasketError::NotFound(fingerprint.to_string()))
            }
            Err(error) => Err(error.into()),
        }
    }

    /// Remove a blob and reclaim its shard directory once it is empty.
    pub fn delete(&self, fingerprint: &str) -> Result<()> {
        let path = self.resolve(fingerprint)?;

        match fs::remove_file(&path.file_path) {
            Ok(()) => {}
            Err(error) if error.kind() == ErrorKind::NotFound => {
                return Err(CasketError::NotFound(fingerprint.to_string()));
            }
            Err(error) => return Err(error.into()),
        }

        tracing::debug!("Deleted blob {}", fingerprint);

        if reclaim_shard_dir(&path.shard_dir) {
            tracing::debug!("Reclaimed empty shard directory {:?}", path.shard_dir);
        }

        Ok(())
    }

    pub fn exists(&self, fingerprint: &str) -> bool {
        match self.resolve(fingerprint) {
            Ok(path) => path.file_path.is_file(),
            Err(_) => false,
        }
    }

    /// Path a fingerprint is (or would be) stored at.
    pub fn blob_path(&self, fingerprint: &str) -> Result<PathBuf> {
        Ok(self.resolve(fingerprint)?.file_path)
    }

    /// Remove temporary files left behind by writes that never reached the
    /// rename, then reclaim shard directories that became empty.
    pub fn recover(&self) -> Result<RecoveryReport> {
        let mut report = RecoveryReport::default();

        for entry in fs::read_dir(&self.root)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(error) => {
                    tracing::warn!("Failed to read entry under {:?}: {}", self.root, error);
                    continue;
                }
            };

            let is_shard = entry
                .file_name()
                .to_str()
                .map(is_shard_name)
                .unwrap_or(false);
            if !is_shard || !entry.path().is_dir() {
                continue;
            }

            let shard_dir = entry.path();
            report.removed_temp_files += sweep_temp_files(&shard_dir);

            if reclaim_shard_dir(&shard_dir) {
                report.reclaimed_shards += 1;
            }
        }

        Ok(report)
    }

    fn resolve(&self, fingerprint: &str) -> Result<ShardPath> {
        let fingerprint = Fingerprint::parse(self.algorithm, fingerprint)?;
        ShardPath::resolve(&self.root, fingerprint.as_str())
    }
}

fn sweep_temp_files(shard_dir: &Path) -> usize {
    let entries = match fs::read_dir(shard_dir) {
        Ok(entries) => entries,
        Err(error) => {
            tracing::warn!("Failed to list shard {:?}: {}", shard_dir, error);
            return 0;
        }
    };

    let mut removed = 0usize;
    for entry in entries.flatten() {
        let is_temp = entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with(TEMP_PREFIX))
            .unwrap_or(false);
        if !is_temp {
            continue;
        }

        match fs::remove_file(entry.path()) {
            Ok(()) => {
                tracing::info!("Removed stale temporary file {:?}", entry.path());
                removed += 1;
            }
            Err(error) if error.kind() == ErrorKind::NotFound => {}
            Err(error) => {
                tracing::warn!(
                    "Failed to remove stale temporary file {:?}: {}",
                    entry.path(),
                    error
                );
            }
        }
    }

    removed
}

/// Remove `shard_dir` if it is empty. `remove_dir` refuses non-empty
/// directories, so a concurrent write into the shard simply wins.
fn reclaim_shard_dir(shard_dir: &Path) -> bool {
    match fs::remove_dir(shard_dir) {
        Ok(()) => true,
        Err(error)
            if matches!(
                error.kind(),
                ErrorKind::DirectoryNotEmpty | ErrorKind::NotFound
            ) =>
        {
            false
        }
        Err(error) => {
            tracing::warn!("Failed to reclaim shard directory {:?}: {}", shard_dir, error);
            false
        }
    }
}
