use super::run_blocking;
use crate::{BlobStore, CasketError, Result};
use std::sync::Arc;

#[derive(Clone)]
pub struct DeleteBlobOperation {
    store: Arc<BlobStore>,
}

#[derive(Debug, Clone)]
pub struct DeleteBlobOperationRequest {
    pub fingerprint: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteBlobOperationOutcome {
    Deleted,
    NotFound,
}

impl DeleteBlobOperation {
    pub fn new(store: Arc<BlobStore>) -> Self {
        Self { store }
    }

    pub async fn run(
        &self,
        request: DeleteBlobOperationRequest,
    ) -> Result<DeleteBlobOperationOutcome> {
        let DeleteBlobOperationRequest { fingerprint } = request;

        match run_blocking(&self.store, move |store| store.delete(&fingerprint)).await {
            Ok(()) => Ok(DeleteBlobOperationOutcome::Deleted),
            Err(CasketError::NotFound(_)) => Ok(DeleteBlobOperationOutcome::NotFound),
            Err(error) => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoreOptions;

    #[tokio::test]
    async fn test_delete_blob_operation() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = Arc::new(BlobStore::open(StoreOptions::new(temp_dir.path())).unwrap());
        let fp = store.put(b"hello").unwrap();
        let operation = DeleteBlobOperation::new(store.clone());

        let request = DeleteBlobOperationRequest {
            fingerprint: fp.to_string(),
        };
        assert_eq!(
            operation.run(request.clone()).await.unwrap(),
            DeleteBlobOperationOutcome::Deleted
        );
        assert_eq!(
            operation.run(request).await.unwrap(),
            DeleteBlobOperationOutcome::NotFound
        );
        assert!(!temp_dir.path().join("5d").exists());
    }
}
