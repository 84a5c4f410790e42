pub mod delete_blob;
pub mod head_blob;
pub mod put_blob;
pub mod read_blob;

pub use delete_blob::{
    DeleteBlobOperation, DeleteBlobOperationOutcome, DeleteBlobOperationRequest,
};
pub use head_blob::{HeadBlobOperation, HeadBlobOperationOutcome, HeadBlobOperationRequest};
pub use put_blob::{PutBlobOperation, PutBlobOperationRequest, PutBlobOperationResult};
pub use read_blob::{ReadBlobOperation, ReadBlobOperationOutcome, ReadBlobOperationRequest};

use crate::{BlobStore, CasketError, Result};
use std::sync::Arc;

/// Run a blocking store call off the async executor.
pub(crate) async fn run_blocking<T, F>(store: &Arc<BlobStore>, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&BlobStore) -> Result<T> + Send + 'static,
{
    let store = store.clone();
    tokio::task::spawn_blocking(move || f(&store))
        .await
        .map_err(|error| CasketError::Internal(format!("blocking store task failed: {}", error)))?
}
