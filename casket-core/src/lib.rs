//! Casket Core - content-addressed blob storage on a local filesystem
//!
//! - MD5 (or SHA256) fingerprints as storage keys
//! - `<root>/<fp[0:2]>/<fp>` sharded layout
//! - temp-file-then-rename publication, so readers never see partial blobs
//! - empty shard directories reclaimed on delete

pub mod error;
pub mod operations;
pub mod storage;

pub use error::{CasketError, Result};
pub use operations::{
    DeleteBlobOperation, DeleteBlobOperationOutcome, DeleteBlobOperationRequest,
    HeadBlobOperation, HeadBlobOperationOutcome, HeadBlobOperationRequest, PutBlobOperation,
    PutBlobOperationRequest, PutBlobOperationResult, ReadBlobOperation, ReadBlobOperationOutcome,
    ReadBlobOperationRequest,
};
pub use storage::{
    AtomicWriter, BlobStore, Fingerprint, FingerprintAlgorithm, RecoveryReport, SHARD_PREFIX_LEN,
    ShardPath, StagedWrite, StoreOptions, TEMP_PREFIX, compute_fingerprint,
};
