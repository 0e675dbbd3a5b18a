//! `GET /s3?uri=s3://bucket/key` — copy an object into the downloads
//! directory and tell the UI where it landed.

use crate::{
    errors::{ApiError, HandlerError, Unhandled},
    handlers::guard::{map_api_errors, query_args},
    services::{file_service::StagedFile, object_store::download_path},
    state::AppState,
    validators::parse_object_reference,
};
use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    response::Response,
};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct FetchQuery {
    pub uri: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PathResponse {
    pub path: String,
}

/// Fetch one object and materialize it under the downloads directory.
///
/// Credentials are checked before the URI, so a server without store
/// credentials answers 401 whatever was asked for.
pub async fn fetch_object(
    State(state): State<AppState>,
    query: Result<Query<FetchQuery>, QueryRejection>,
) -> Result<Response, Unhandled> {
    map_api_errors(async move {
        let credentials = state.config.store.as_ref().ok_or_else(|| {
            ApiError::authentication(
                "Cannot connect to S3: JupyterLab environment does not have credentials",
            )
        })?;

        let query = query_args(query)?;
        let reference = parse_object_reference(query.uri.as_deref())?;
        let path = download_path(&state.config.downloads_dir, reference.key())?;

        let mut staged = StagedFile::create(&path).await?;
        let written = match state
            .fetcher
            .fetch(credentials, &reference, staged.file_mut())
            .await
        {
            Ok(written) => written,
            Err(err) => {
                staged.discard().await;
                return Err(err.into());
            }
        };
        let path = staged.commit().await?;

        info!("fetched {} ({} bytes) to {}", reference, written, path.display());
        Ok::<_, HandlerError>(Json(PathResponse {
            path: path.display().to_string(),
        }))
    })
    .await
}
