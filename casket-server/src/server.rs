use crate::config::Config;
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use casket_core::{
    BlobStore, CasketError, DeleteBlobOperation, DeleteBlobOperationOutcome,
    DeleteBlobOperationRequest, HeadBlobOperation, HeadBlobOperationOutcome,
    HeadBlobOperationRequest, PutBlobOperation, PutBlobOperationRequest, ReadBlobOperation,
    ReadBlobOperationOutcome, ReadBlobOperationRequest, Result,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub struct ServerState {
    pub store: Arc<BlobStore>,
    pub put_blob: PutBlobOperation,
    pub read_blob: ReadBlobOperation,
    pub delete_blob: DeleteBlobOperation,
    pub head_blob: HeadBlobOperation,
    pub config: Config,
}

impl ServerState {
    pub fn new(config: Config) -> Result<Self> {
        let store = Arc::new(BlobStore::open(config.storage.store_options())?);

        Ok(Self {
            put_blob: PutBlobOperation::new(store.clone()),
            read_blob: ReadBlobOperation::new(store.clone()),
            delete_blob: DeleteBlobOperation::new(store.clone()),
            head_blob: HeadBlobOperation::new(store.clone()),
            store,
            config,
        })
    }
}

#[derive(Debug, Serialize)]
struct UploadResponse {
    file_hash: String,
}

#[derive(Debug, Serialize)]
struct DescriptionResponse {
    description: String,
}

#[derive(Debug, Deserialize)]
struct DeleteRequest {
    name: Option<String>,
}

fn describe(status: StatusCode, description: impl Into<String>) -> Response {
    let body = DescriptionResponse {
        description: description.into(),
    };
    (status, Json(body)).into_response()
}

fn error_response(error: CasketError) -> Response {
    let status = match &error {
        CasketError::InvalidFingerprint(_) | CasketError::InvalidRequest(_) => {
            StatusCode::BAD_REQUEST
        }
        CasketError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        tracing::error!("Request failed: {}", error);
    }

    describe(status, error.to_string())
}

fn not_found(name: &str) -> Response {
    describe(StatusCode::NOT_FOUND, format!("File {} - not found!", name))
}

pub fn build_router(state: Arc<ServerState>) -> Router {
    let max_body_bytes = state.config.server.max_body_bytes;

    Router::new()
        .route("/", get(root_page))
        .route("/health", get(health_handler))
        .route("/file", post(upload_file).delete(delete_file))
        .route(
            "/file/:name",
            get(download_file)
                .head(head_file)
                .delete(delete_file_by_name),
        )
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(config: Config) -> Result<()> {
    let bind_addr = config.server.bind_addr.clone();
    let state = Arc::new(ServerState::new(config)?);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn root_page() -> impl IntoResponse {
    let response = serde_json::json!({
        "description": "Content-addressed file store. Files are keyed by the hash of their contents.",
        "upload": "For upload file send POST request to path '/file'.",
        "download": "For download file send GET request to path '/file/{name}'.",
        "exists": "For checking a file send HEAD request to path '/file/{name}'.",
        "delete": "For removing file send DELETE request to path '/file/{name}', or to '/file' \
                   with a 'json' body containing key 'name'.",
    });

    (StatusCode::OK, Json(response))
}

async fn health_handler(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let response = serde_json::json!({
        "status": "ok",
        "algorithm": state.store.algorithm().name(),
    });

    (StatusCode::OK, Json(response))
}

async fn upload_file(State(state): State<Arc<ServerState>>, body: Bytes) -> Response {
    match state.put_blob.run(PutBlobOperationRequest { body }).await {
        Ok(result) => {
            tracing::info!(
                "Uploaded file {} ({} bytes)",
                result.fingerprint,
                result.size_bytes
            );
            let response = UploadResponse {
                file_hash: result.fingerprint.into_string(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(error) => error_response(error),
    }
}

async fn download_file(
    State(state): State<Arc<ServerState>>,
    Path(name): Path<String>,
) -> Response {
    let request = ReadBlobOperationRequest {
        fingerprint: name.clone(),
    };

    match state.read_blob.run(request).await {
        Ok(ReadBlobOperationOutcome::Found(body)) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/octet-stream")],
            body,
        )
            .into_response(),
        Ok(ReadBlobOperationOutcome::NotFound) => not_found(&name),
        Err(error) => error_response(error),
    }
}

async fn head_file(State(state): State<Arc<ServerState>>, Path(name): Path<String>) -> Response {
    let request = HeadBlobOperationRequest { fingerprint: name };

    match state.head_blob.run(request).await {
        Ok(HeadBlobOperationOutcome::Found) => StatusCode::OK.into_response(),
        Ok(HeadBlobOperationOutcome::NotFound) => StatusCode::NOT_FOUND.into_response(),
        Err(CasketError::InvalidFingerprint(_)) => StatusCode::BAD_REQUEST.into_response(),
        Err(error) => error_response(error),
    }
}

async fn delete_file(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim_start().starts_with("application/json"))
        .unwrap_or(false);
    if !is_json {
        return error_response(CasketError::InvalidRequest(
            "Content type must be 'json'!".to_string(),
        ));
    }

    let request: DeleteRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(error) => {
            return error_response(CasketError::InvalidRequest(format!(
                "Request body is not valid json: {}",
                error
            )));
        }
    };

    let Some(name) = request.name else {
        return error_response(CasketError::InvalidRequest(
            "Key 'name' must be in request!".to_string(),
        ));
    };

    remove_file(&state, name).await
}

async fn delete_file_by_name(
    State(state): State<Arc<ServerState>>,
    Path(name): Path<String>,
) -> Response {
    remove_file(&state, name).await
}

async fn remove_file(state: &ServerState, name: String) -> Response {
    let request = DeleteBlobOperationRequest {
        fingerprint: name.clone(),
    };

    match state.delete_blob.run(request).await {
        Ok(DeleteBlobOperationOutcome::Deleted) => {
            tracing::info!("Removed file {}", name);
            describe(StatusCode::OK, format!("File '{}' - was removed!", name))
        }
        Ok(DeleteBlobOperationOutcome::NotFound) => not_found(&name),
        Err(error) => error_response(error),
    }
}
