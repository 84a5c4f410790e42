use crate::error::{CasketError, Result};
use std::fs;
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Prefix of in-flight temporary files. Fingerprints are hex, so a name with
/// this prefix can never be mistaken for a published blob.
pub const TEMP_PREFIX: &str = ".tmp-";

/// Writes files so that the final path only ever holds a complete payload.
///
/// The payload is written to a uniquely named temporary file next to the
/// target and then renamed over it. Rename is the single publish point.
#[derive(Debug, Clone, Copy)]
pub struct AtomicWriter {
    sync: bool,
}

/// A fully written temporary file that has not been published yet.
///
/// Dropping it without calling [`StagedWrite::commit`] removes the temporary
/// file and leaves the target untouched.
#[derive(Debug)]
pub struct StagedWrite {
    temp: NamedTempFile,
    target: PathBuf,
    sync: bool,
}

impl AtomicWriter {
    pub fn new(sync: bool) -> Self {
        Self { sync }
    }

    pub fn sync(&self) -> bool {
        self.sync
    }

    /// Atomically publish `payload` at `target`.
    pub fn write(&self, target: &Path, payload: &[u8]) -> Result<()> {
        self.stage(target, payload)?.commit()
    }

    /// Create the parent directory, then write and optionally fsync the
    /// payload into a temporary file beside `target`.
    pub fn stage(&self, target: &Path, payload: &[u8]) -> Result<StagedWrite> {
        self.stage_with(target, |file| file.write_all(payload))
    }

    /// Like [`AtomicWriter::stage`], with the temp file contents produced by
    /// `fill`. Any error from `fill` is reported as `WriteFailed`.
    pub(crate) fn stage_with<F>(&self, target: &Path, fill: F) -> Result<StagedWrite>
    where
        F: FnOnce(&mut fs::File) -> std::io::Result<()>,
    {
        let parent = target.parent().ok_or_else(|| {
            CasketError::Internal(format!("target has no parent directory: {:?}", target))
        })?;

        fs::create_dir_all(parent)?;

        let write_failed = |source: std::io::Error| CasketError::WriteFailed {
            path: target.to_path_buf(),
            source,
        };

        let mut builder = tempfile::Builder::new();
        builder.prefix(TEMP_PREFIX);
        // Same mode as File::create; tempfile defaults to 0600.
        #[cfg(unix)]
        builder.permissions(fs::Permissions::from_mode(0o666));

        let mut temp = builder.tempfile_in(parent).map_err(write_failed)?;

        fill(temp.as_file_mut()).map_err(write_failed)?;
        if self.sync {
            temp.as_file().sync_all().map_err(write_failed)?;
        }

        Ok(StagedWrite {
            temp,
            target: target.to_path_buf(),
            sync: self.sync,
        })
    }
}

impl StagedWrite {
    pub fn temp_path(&self) -> &Path {
        self.temp.path()
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Rename the temporary file onto the target path.
    pub fn commit(self) -> Result<()> {
        let StagedWrite { temp, target, sync } = self;

        // On failure the temp file comes back inside the error and is
        // unlinked when it drops.
        temp.persist(&target)
            .map_err(|error| CasketError::PublishFailed {
                path: target.clone(),
                source: error.error,
            })?;

        if sync {
            sync_parent_dir(&target);
        }

        Ok(())
    }
}

#[cfg(unix)]
fn sync_parent_dir(target: &Path) {
    let Some(parent) = target.parent() else {
        return;
    };

    if let Err(error) = fs::File::open(parent).and_then(|dir| dir.sync_all()) {
        tracing::warn!("Failed to sync directory {:?}: {}", parent, error);
    }
}

#[cfg(not(unix))]
fn sync_parent_dir(_target: &Path) {}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_entries(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .filter(|name| name.starts_with(TEMP_PREFIX))
            .collect()
    }

    #[test]
    fn test_write_publishes_payload() {
        let temp_dir = tempfile::tempdir().unwrap();
        let target = temp_dir.path().join("ab").join("abcdef");

        AtomicWriter::new(true).write(&target, b"payload").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"payload");
        assert!(temp_entries(&temp_dir.path().join("ab")).is_empty());
    }

    #[test]
    fn test_write_replaces_existing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let target = temp_dir.path().join("file");
        fs::write(&target, b"old").unwrap();

        AtomicWriter::new(false).write(&target, b"new").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"new");
    }

    #[test]
    fn test_staged_write_is_invisible_until_commit() {
        let temp_dir = tempfile::tempdir().unwrap();
        let target = temp_dir.path().join("cd").join("cdef");

        let staged = AtomicWriter::new(false).stage(&target, b"data").unwrap();
        assert!(!target.exists());
        assert!(staged.temp_path().exists());
        assert_eq!(staged.temp_path().parent(), target.parent());

        staged.commit().unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"data");
    }

    #[test]
    fn test_dropped_stage_cleans_up() {
        let temp_dir = tempfile::tempdir().unwrap();
        let target = temp_dir.path().join("ef").join("ef01");

        let staged = AtomicWriter::new(false).stage(&target, b"data").unwrap();
        let temp_path = staged.temp_path().to_path_buf();
        drop(staged);

        assert!(!temp_path.exists());
        assert!(!target.exists());
        assert!(temp_entries(&temp_dir.path().join("ef")).is_empty());
    }

    #[test]
    fn test_write_failure_cleans_up_temp_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let shard = temp_dir.path().join("45");
        let target = shard.join("4567");

        let err = AtomicWriter::new(true)
            .stage_with(&target, |file| {
                file.write_all(b"part")?;
                Err(std::io::Error::other("no space left on device"))
            })
            .unwrap_err();

        assert!(matches!(err, CasketError::WriteFailed { .. }));
        assert!(!target.exists());
        assert!(temp_entries(&shard).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_published_mode_matches_plain_write() {
        let temp_dir = tempfile::tempdir().unwrap();
        let target = temp_dir.path().join("67").join("6789");
        let plain = temp_dir.path().join("plain");

        AtomicWriter::new(false).write(&target, b"data").unwrap();
        fs::write(&plain, b"data").unwrap();

        let mode = |path: &Path| fs::metadata(path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&target), mode(&plain));
    }

    #[test]
    fn test_publish_failure_leaves_target_untouched() {
        let temp_dir = tempfile::tempdir().unwrap();
        let shard = temp_dir.path().join("01");
        // A non-empty directory at the target path makes the rename fail.
        let target = shard.join("0123");
        fs::create_dir_all(target.join("occupied")).unwrap();

        let err = AtomicWriter::new(false).write(&target, b"data").unwrap_err();

        assert!(matches!(err, CasketError::PublishFailed { .. }));
        assert!(target.is_dir());
        assert!(temp_entries(&shard).is_empty());
    }

    #[test]
    fn test_publish_failure_when_directory_removed() {
        let temp_dir = tempfile::tempdir().unwrap();
        let shard = temp_dir.path().join("23");
        let target = shard.join("2345");

        let staged = AtomicWriter::new(false).stage(&target, b"data").unwrap();
        fs::remove_file(staged.temp_path()).unwrap();
        fs::remove_dir(&shard).unwrap();

        let err = staged.commit().unwrap_err();
        assert!(matches!(err, CasketError::PublishFailed { .. }));
        assert!(!target.exists());
    }
}
