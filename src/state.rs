//! Shared, read-only context handed to every handler.

use crate::{
    config::AppConfig,
    services::{
        object_store::{ObjectFetcher, S3ObjectFetcher},
        upstream::UpstreamClient,
    },
};
use anyhow::Result;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// Configuration and credentials, read once at startup.
    pub config: Arc<AppConfig>,
    pub fetcher: Arc<dyn ObjectFetcher>,
    pub upstream: UpstreamClient,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self> {
        let upstream = UpstreamClient::new(config.proxy_timeout)?;
        let fetcher = Arc::new(S3ObjectFetcher::new(config.s3_region.clone()));
        Ok(Self {
            config: Arc::new(config),
            fetcher,
            upstream,
        })
    }

    /// Swap the object-store client, e.g. for an in-memory fake.
    #[cfg(test)]
    pub fn with_fetcher(mut self, fetcher: Arc<dyn ObjectFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }
}
