//! `GET /reroute?route=<path>` — forward a request to the Onyx API.

use crate::{
    errors::{ApiError, HandlerError, Unhandled},
    handlers::guard::{map_api_errors, query_args},
    state::AppState,
};
use axum::{
    body::Body,
    extract::{Query, State, rejection::QueryRejection},
    http::{StatusCode, header},
    response::Response,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct RerouteQuery {
    pub route: Option<String>,
}

/// Proxy `route` to `ONYX_DOMAIN` with the configured token.
///
/// The upstream body and content type come back verbatim with a 200, even
/// when the upstream itself answered with an error status; the UI reads the
/// body. Only a refused connection (502) or the client deadline (504) are
/// reported as failures.
pub async fn reroute(
    State(state): State<AppState>,
    query: Result<Query<RerouteQuery>, QueryRejection>,
) -> Result<Response, Unhandled> {
    map_api_errors(async move {
        let credentials = state.config.onyx.as_ref().ok_or_else(|| {
            ApiError::authentication(
                "Cannot connect to Onyx: JupyterLab environment does not have credentials",
            )
        })?;

        let query = query_args(query)?;
        let route = match query.route.as_deref() {
            Some(route) if !route.is_empty() => route,
            _ => return Err(ApiError::validation("Route is required").into()),
        };

        let upstream = state.upstream.get(credentials, route).await?;
        tracing::debug!("upstream answered {} for {}", upstream.status, route);

        let mut response = Response::new(Body::from(upstream.body));
        *response.status_mut() = StatusCode::OK;
        if let Some(content_type) = upstream.content_type {
            response
                .headers_mut()
                .insert(header::CONTENT_TYPE, content_type);
        }
        Ok::<_, HandlerError>(response)
    })
    .await
}
