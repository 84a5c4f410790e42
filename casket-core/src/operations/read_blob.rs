use super::run_blocking;
use crate::{BlobStore, CasketError, Result};
use bytes::Bytes;
use std::sync::Arc;

#[derive(Clone)]
pub struct ReadBlobOperation {
    store: Arc<BlobStore>,
}

#[derive(Debug, Clone)]
pub struct ReadBlobOperationRequest {
    pub fingerprint: String,
}

#[derive(Debug, Clone)]
pub enum ReadBlobOperationOutcome {
    Found(Bytes),
    NotFound,
}

impl ReadBlobOperation {
    pub fn new(store: Arc<BlobStore>) -> Self {
        Self { store }
    }

    pub async fn run(&self, request: ReadBlobOperationRequest) -> Result<ReadBlobOperationOutcome> {
        let ReadBlobOperationRequest { fingerprint } = request;

        match run_blocking(&self.store, move |store| store.get(&fingerprint)).await {
            Ok(body) => Ok(ReadBlobOperationOutcome::Found(body)),
            Err(CasketError::NotFound(_)) => Ok(ReadBlobOperationOutcome::NotFound),
            Err(error) => Err(error),
        }
    }
}
