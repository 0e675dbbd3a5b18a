//! Object-store access for the `/s3` route.
//!
//! [`ObjectFetcher`] is the seam between the handler and the storage client;
//! [`S3ObjectFetcher`] is the production implementation on `aws-sdk-s3`.
//! Only connection-class failures are classified here, everything else the
//! client reports stays unclassified.

use crate::{
    config::StoreCredentials,
    errors::{ApiError, HandlerError},
    models::object_reference::ObjectReference,
};
use async_trait::async_trait;
use aws_sdk_s3::{
    Client,
    config::{BehaviorVersion, Credentials, Region},
    error::{DisplayErrorContext, SdkError},
};
use std::{
    io,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};

const MAX_OBJECT_KEY_LEN: usize = 1024;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("connection to the object store failed: {0}")]
    Connect(String),
    #[error("object store request timed out")]
    Timeout,
    #[error("object store request failed: {0}")]
    Service(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<FetchError> for HandlerError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Connect(_) => ApiError::UpstreamUnavailable(
                "Failed to connect to S3: Connection refused".into(),
            )
            .into(),
            FetchError::Timeout => {
                ApiError::UpstreamTimeout("Failed to connect to S3: Gateway timeout".into()).into()
            }
            other => HandlerError::Unhandled(other.into()),
        }
    }
}

/// Copies one object out of the store.
#[async_trait]
pub trait ObjectFetcher: Send + Sync {
    /// Stream the object named by `reference` into `dest`, returning the
    /// number of bytes written.
    async fn fetch(
        &self,
        credentials: &StoreCredentials,
        reference: &ObjectReference,
        dest: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> Result<u64, FetchError>;
}

/// S3-compatible fetcher talking to the endpoint from the credentials.
#[derive(Debug, Clone)]
pub struct S3ObjectFetcher {
    region: String,
}

impl S3ObjectFetcher {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
        }
    }

    fn client(&self, credentials: &StoreCredentials) -> Client {
        let creds = Credentials::new(
            &credentials.access_key_id,
            credentials.secret_access_key.expose(),
            None,
            None,
            "onyx-bridge",
        );

        let config = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(self.region.clone()))
            .credentials_provider(creds)
            .endpoint_url(&credentials.endpoint)
            .force_path_style(true)
            .build();

        Client::from_conf(config)
    }
}

#[async_trait]
impl ObjectFetcher for S3ObjectFetcher {
    async fn fetch(
        &self,
        credentials: &StoreCredentials,
        reference: &ObjectReference,
        dest: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> Result<u64, FetchError> {
        let output = self
            .client(credentials)
            .get_object()
            .bucket(reference.container())
            .key(reference.key())
            .send()
            .await
            .map_err(classify_sdk_error)?;

        let mut body = output.body;
        let mut written = 0u64;
        while let Some(chunk) = body
            .try_next()
            .await
            .map_err(|err| FetchError::Service(DisplayErrorContext(&err).to_string()))?
        {
            dest.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        dest.flush().await?;

        Ok(written)
    }
}

fn classify_sdk_error<E, R>(err: SdkError<E, R>) -> FetchError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match &err {
        SdkError::TimeoutError(_) => FetchError::Timeout,
        SdkError::DispatchFailure(failure) if failure.is_timeout() => FetchError::Timeout,
        SdkError::DispatchFailure(failure) if failure.is_io() => {
            FetchError::Connect(DisplayErrorContext(&err).to_string())
        }
        _ => FetchError::Service(DisplayErrorContext(&err).to_string()),
    }
}

/// Resolve an object key to a file path beneath `root`.
///
/// Keys are relative paths; anything that would leave `root`, name a
/// directory, or smuggle control characters is rejected.
pub fn download_path(root: &Path, key: &str) -> Result<PathBuf, ApiError> {
    let invalid = || ApiError::validation(format!("Invalid S3 object key: {key}"));

    if key.len() > MAX_OBJECT_KEY_LEN {
        return Err(invalid());
    }
    if key.chars().any(|c| c.is_control() || c == '\\') {
        return Err(invalid());
    }
    if key
        .split('/')
        .any(|segment| matches!(segment, "" | "." | ".."))
    {
        return Err(invalid());
    }

    Ok(root.join(key))
}
