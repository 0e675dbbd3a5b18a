//! `POST /file-write?path=<name>` with body `{"content": "..."}`.

use crate::{
    errors::{HandlerError, Unhandled},
    handlers::{
        guard::{map_api_errors, query_args},
        object_handlers::PathResponse,
    },
    models::file_target::FileTarget,
    services::file_service::write_text,
    state::AppState,
};
use axum::{
    Json,
    body::Bytes,
    extract::{Query, State, rejection::QueryRejection},
    response::Response,
};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct FileWriteQuery {
    pub path: Option<String>,
}

/// Write validated content to `<workspace>/<name>`.
///
/// The reported `path` is relative to the workspace root, the directory the
/// notebook UI opens files from. `/s3` reports the full download path instead.
/// Writing the same name and content twice leaves the same file and returns
/// the same body.
pub async fn file_write(
    State(state): State<AppState>,
    query: Result<Query<FileWriteQuery>, QueryRejection>,
    body: Bytes,
) -> Result<Response, Unhandled> {
    map_api_errors(async move {
        let query = query_args(query)?;
        let target = FileTarget::from_request(query.path.as_deref(), &body)?;

        let destination = state.config.workspace_dir.join(&target.name);
        write_text(&destination, &target.content).await?;

        info!("wrote {} bytes to {}", target.content.len(), destination.display());
        Ok::<_, HandlerError>(Json(PathResponse { path: target.name }))
    })
    .await
}
