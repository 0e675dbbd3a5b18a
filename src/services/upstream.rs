//! Outbound client for the upstream Onyx API.

use crate::{
    config::OnyxCredentials,
    errors::{ApiError, HandlerError},
};
use anyhow::Result;
use axum::{
    body::Bytes,
    http::{HeaderValue, StatusCode, header},
};
use std::{error::Error as StdError, io, time::Duration};
use thiserror::Error;

/// What the upstream answered, kept verbatim.
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Failed to connect to Onyx: Connection refused")]
    Refused,
    #[error("Failed to connect to Onyx: Gateway timeout")]
    Timeout,
    #[error(transparent)]
    Other(#[from] reqwest::Error),
}

impl From<UpstreamError> for HandlerError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Refused => ApiError::UpstreamUnavailable(err.to_string()).into(),
            UpstreamError::Timeout => ApiError::UpstreamTimeout(err.to_string()).into(),
            UpstreamError::Other(inner) => HandlerError::Unhandled(inner.into()),
        }
    }
}

/// Non-blocking HTTP client with a fixed per-request deadline.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
}

impl UpstreamClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    /// `GET <domain>/<route>` with the Onyx token attached.
    ///
    /// Any upstream status is a success here; only a refused connection and
    /// the client deadline are classified.
    pub async fn get(
        &self,
        credentials: &OnyxCredentials,
        route: &str,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let url = url_path_join(&credentials.domain, route);
        tracing::debug!("proxying to {}", url);

        let response = self
            .http
            .get(&url)
            .header(
                header::AUTHORIZATION,
                format!("Token {}", credentials.token.expose()),
            )
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        let content_type = response.headers().get(header::CONTENT_TYPE).cloned();
        let body = response.bytes().await.map_err(classify)?;

        Ok(UpstreamResponse {
            status,
            content_type,
            body,
        })
    }
}

/// Join two URL pieces with exactly one `/` between them.
pub fn url_path_join(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn classify(err: reqwest::Error) -> UpstreamError {
    if err.is_timeout() {
        UpstreamError::Timeout
    } else if err.is_connect() && caused_by_refusal(&err) {
        UpstreamError::Refused
    } else {
        UpstreamError::Other(err)
    }
}

fn caused_by_refusal(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(source) = current {
        if let Some(io_err) = source.downcast_ref::<io::Error>() {
            if io_err.kind() == io::ErrorKind::ConnectionRefused {
                return true;
            }
        }
        current = source.source();
    }
    false
}
