use super::run_blocking;
use crate::{BlobStore, Fingerprint, Result};
use bytes::Bytes;
use std::sync::Arc;

#[derive(Clone)]
pub struct PutBlobOperation {
    store: Arc<BlobStore>,
}

#[derive(Debug, Clone)]
pub struct PutBlobOperationRequest {
    pub body: Bytes,
}

#[derive(Debug, Clone)]
pub struct PutBlobOperationResult {
    pub fingerprint: Fingerprint,
    pub size_bytes: u64,
}

impl PutBlobOperation {
    pub fn new(store: Arc<BlobStore>) -> Self {
        Self { store }
    }

    pub async fn run(&self, request: PutBlobOperationRequest) -> Result<PutBlobOperationResult> {
        let PutBlobOperationRequest { body } = request;
        let size_bytes = body.len() as u64;

        let fingerprint = run_blocking(&self.store, move |store| store.put(&body)).await?;

        Ok(PutBlobOperationResult {
            fingerprint,
            size_bytes,
        })
    }
}
