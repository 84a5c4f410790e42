use super::run_blocking;
use crate::{BlobStore, Fingerprint, Result};
use std::sync::Arc;

#[derive(Clone)]
pub struct HeadBlobOperation {
    store: Arc<BlobStore>,
}

#[derive(Debug, Clone)]
pub struct HeadBlobOperationRequest {
    pub fingerprint: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadBlobOperationOutcome {
    Found,
    NotFound,
}

impl HeadBlobOperation {
    pub fn new(store: Arc<BlobStore>) -> Self {
        Self { store }
    }

    /// Existence check. Malformed fingerprints are rejected so the caller can
    /// tell them apart from absent blobs.
    pub async fn run(&self, request: HeadBlobOperationRequest) -> Result<HeadBlobOperationOutcome> {
        let HeadBlobOperationRequest { fingerprint } = request;
        let algorithm = self.store.algorithm();

        let exists = run_blocking(&self.store, move |store| {
            let fingerprint = Fingerprint::parse(algorithm, &fingerprint)?;
            Ok(store.exists(fingerprint.as_str()))
        })
        .await?;

        if exists {
            Ok(HeadBlobOperationOutcome::Found)
        } else {
            Ok(HeadBlobOperationOutcome::NotFound)
        }
    }
}
