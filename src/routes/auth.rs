//! Access-token gate in front of the widget routes.
//!
//! Disabled unless a token is configured. Callers present it either as
//! `Authorization: token <t>` (or `Bearer <t>`) or as a `?token=<t>` query
//! argument.

use crate::{errors::ApiError, state::AppState};
use axum::{
    extract::{Query, Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use subtle::ConstantTimeEq;

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

pub async fn require_token(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(expected) = state.config.access_token.as_ref() else {
        return next.run(request).await;
    };

    match presented_token(&request) {
        Some(token) if token_matches(&token, expected.expose()) => next.run(request).await,
        _ => {
            tracing::warn!("rejected request to {} without a valid token", request.uri().path());
            ApiError::Permission("Forbidden".into()).into_response()
        }
    }
}

fn presented_token(request: &Request) -> Option<String> {
    let from_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| {
            let (scheme, token) = value.split_once(' ')?;
            let known = scheme.eq_ignore_ascii_case("token") || scheme.eq_ignore_ascii_case("bearer");
            known.then(|| token.trim().to_string())
        });

    from_header.or_else(|| {
        Query::<TokenQuery>::try_from_uri(request.uri())
            .ok()
            .and_then(|Query(query)| query.token)
    })
}

fn token_matches(given: &str, expected: &str) -> bool {
    given.as_bytes().ct_eq(expected.as_bytes()).into()
}
