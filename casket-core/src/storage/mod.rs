//! Storage modules for Casket
//!
//! Provides fingerprinting, the sharded on-disk layout and atomic file
//! publication used by the blob store.

pub mod atomic_writer;
pub mod blob_store;
pub mod fingerprint;
pub mod shard;

pub use atomic_writer::{AtomicWriter, StagedWrite, TEMP_PREFIX};
pub use blob_store::{BlobStore, RecoveryReport, StoreOptions};
pub use fingerprint::{Fingerprint, FingerprintAlgorithm, compute_fingerprint};
pub use shard::{SHARD_PREFIX_LEN, ShardPath};
