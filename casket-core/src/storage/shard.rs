use crate::error::{CasketError, Result};
use std::path::{Path, PathBuf};

/// Number of leading fingerprint characters used as the shard directory name.
pub const SHARD_PREFIX_LEN: usize = 2;

/// On-disk location of a blob: `<root>/<fp[0:2]>/<fp>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardPath {
    pub shard_dir: PathBuf,
    pub file_path: PathBuf,
}

impl ShardPath {
    /// Resolve the shard directory and file path for a fingerprint.
    ///
    /// Only ASCII hex digits are accepted, so the result can never escape
    /// `root` or name a reserved entry.
    pub fn resolve(root: &Path, fingerprint: &str) -> Result<Self> {
        if fingerprint.len() < SHARD_PREFIX_LEN {
            return Err(CasketError::InvalidFingerprint(format!(
                "fingerprint shorter than shard prefix: {:?}",
                fingerprint
            )));
        }

        if !fingerprint.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(CasketError::InvalidFingerprint(format!(
                "fingerprint contains unsafe characters: {:?}",
                fingerprint
            )));
        }

        let shard_dir = root.join(&fingerprint[..SHARD_PREFIX_LEN]);
        let file_path = shard_dir.join(fingerprint);

        Ok(Self {
            shard_dir,
            file_path,
        })
    }
}

/// Whether a directory entry name looks like a shard directory.
pub fn is_shard_name(name: &str) -> bool {
    name.len() == SHARD_PREFIX_LEN && name.bytes().all(|b| b.is_ascii_hexdigit())
}
