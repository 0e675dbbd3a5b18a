//! Defines the routes the notebook widget calls.
//!
//! ## Structure (all below the configured base prefix)
//! - `GET  /healthz`         — liveness, never gated
//! - `GET  /widget-enabled`  — are the Onyx credentials configured
//! - `GET  /s3?uri=`         — materialize an object-store object locally
//! - `GET  /reroute?route=`  — proxy to the Onyx API
//! - `GET  /version`         — package version
//! - `POST /file-write?path=` — write validated content to a local file

use crate::{
    handlers::{
        file_handlers::file_write,
        object_handlers::fetch_object,
        proxy_handlers::reroute,
        status_handlers::{healthz, version, widget_enabled},
    },
    routes::auth::require_token,
    state::AppState,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};

/// Build the widget routes, unprefixed.
///
/// Everything except `/healthz` sits behind the access-token gate.
pub fn routes(state: &AppState) -> Router<AppState> {
    let gated = Router::new()
        .route("/widget-enabled", get(widget_enabled))
        .route("/s3", get(fetch_object))
        .route("/reroute", get(reroute))
        .route("/version", get(version))
        .route(
            "/file-write",
            post(file_write).layer(DefaultBodyLimit::max(state.config.max_body_size)),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token));

    Router::new().route("/healthz", get(healthz)).merge(gated)
}

/// Mount [`routes`] under the configured base prefix and attach the state.
pub fn app(state: AppState) -> Router {
    let routes = routes(&state);
    let base_url = state.config.base_url.clone();
    let router = if base_url.is_empty() {
        routes
    } else {
        Router::new().nest(&base_url, routes)
    };
    router.with_state(state)
}
