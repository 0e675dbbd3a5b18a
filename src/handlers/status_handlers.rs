//! Status handlers.
//!
//! - GET /healthz         -> liveness ("ok"), no I/O
//! - GET /widget-enabled  -> whether the upstream credentials are configured
//! - GET /version         -> package version

use crate::{
    errors::{HandlerError, Unhandled},
    handlers::guard::map_api_errors,
    state::AppState,
};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::future::ready;

/// `GET /healthz`
///
/// Always 200. Not behind the access-token gate.
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".into(),
        }),
    )
}

/// `GET /widget-enabled`
///
/// `enabled` is true iff both `ONYX_DOMAIN` and `ONYX_TOKEN` were set to
/// non-empty values. Never fails.
pub async fn widget_enabled(State(state): State<AppState>) -> Result<Response, Unhandled> {
    let enabled = state.config.onyx.is_some();
    map_api_errors(ready(Ok::<_, HandlerError>(Json(EnabledResponse { enabled })))).await
}

/// `GET /version`
pub async fn version() -> Result<Response, Unhandled> {
    map_api_errors(ready(Ok::<_, HandlerError>(Json(VersionResponse {
        version: env!("CARGO_PKG_VERSION"),
    }))))
    .await
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

#[derive(Serialize)]
struct EnabledResponse {
    enabled: bool,
}

#[derive(Serialize)]
struct VersionResponse {
    version: &'static str,
}
