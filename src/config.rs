use anyhow::{Context, Result};
use clap::Parser;
use std::{env, fmt, path::PathBuf, time::Duration};

const DEFAULT_BASE_URL: &str = "/climb-onyx-gui";
const DEFAULT_PROXY_TIMEOUT_SECS: u64 = 20;
const DEFAULT_MAX_BODY_SIZE: usize = 100 * 1024 * 1024;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments; read once at startup and
/// shared read-only with every handler.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Mount prefix for every route, e.g. `/climb-onyx-gui` (empty = root).
    pub base_url: String,
    /// Directory objects fetched from the store are materialized into.
    pub downloads_dir: PathBuf,
    /// Directory `file-write` targets are resolved against.
    pub workspace_dir: PathBuf,
    /// Deadline for one proxied upstream request.
    pub proxy_timeout: Duration,
    /// Largest request body `file-write` accepts, in bytes.
    pub max_body_size: usize,
    pub s3_region: String,
    /// When set, every route except `/healthz` requires this token.
    pub access_token: Option<Secret>,
    pub onyx: Option<OnyxCredentials>,
    pub store: Option<StoreCredentials>,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Backend for the Onyx notebook widget")]
pub struct Args {
    /// Host to bind to (overrides ONYX_BRIDGE_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides ONYX_BRIDGE_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Route prefix (overrides ONYX_BRIDGE_BASE_URL)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Where fetched objects are written (overrides ONYX_BRIDGE_DOWNLOADS_DIR)
    #[arg(long)]
    pub downloads_dir: Option<PathBuf>,

    /// Root for file-write targets (overrides ONYX_BRIDGE_WORKSPACE_DIR)
    #[arg(long)]
    pub workspace_dir: Option<PathBuf>,

    /// Upstream request timeout in seconds (overrides ONYX_BRIDGE_PROXY_TIMEOUT)
    #[arg(long)]
    pub proxy_timeout: Option<u64>,

    /// Largest file-write body in bytes (overrides ONYX_BRIDGE_MAX_BODY_SIZE)
    #[arg(long)]
    pub max_body_size: Option<usize>,

    /// Object store region (overrides AWS_REGION)
    #[arg(long)]
    pub s3_region: Option<String>,

    /// Access token required from callers (overrides ONYX_BRIDGE_TOKEN)
    #[arg(long)]
    pub token: Option<String>,
}

/// A string that never shows up in `Debug` output or logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// Domain and token for the upstream Onyx API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnyxCredentials {
    pub domain: String,
    pub token: Secret,
}

impl OnyxCredentials {
    /// Both parts must be present and non-empty.
    pub fn from_parts(domain: Option<String>, token: Option<String>) -> Option<Self> {
        Some(Self {
            domain: non_empty(domain)?,
            token: Secret::new(non_empty(token)?),
        })
    }
}

/// Access key, secret key and endpoint for the object store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreCredentials {
    pub access_key_id: String,
    pub secret_access_key: Secret,
    pub endpoint: String,
}

impl StoreCredentials {
    /// All three parts must be present and non-empty.
    pub fn from_parts(
        access_key_id: Option<String>,
        secret_access_key: Option<String>,
        endpoint: Option<String>,
    ) -> Option<Self> {
        Some(Self {
            access_key_id: non_empty(access_key_id)?,
            secret_access_key: Secret::new(non_empty(secret_access_key)?),
            endpoint: non_empty(endpoint)?,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        // Parse CLI once
        let args = Args::parse();
        Self::from_sources(args, |key| env::var(key).ok())
    }

    /// Merge CLI args over values produced by `lookup` (the environment in
    /// production).
    pub fn from_sources<F>(args: Args, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Environment fallback ---
        let env_host = lookup("ONYX_BRIDGE_HOST").unwrap_or_else(|| "127.0.0.1".into());
        let env_port = match lookup("ONYX_BRIDGE_PORT") {
            Some(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing ONYX_BRIDGE_PORT value `{}`", value))?,
            None => 8890,
        };
        let env_timeout = match lookup("ONYX_BRIDGE_PROXY_TIMEOUT") {
            Some(value) => value
                .parse::<u64>()
                .with_context(|| format!("parsing ONYX_BRIDGE_PROXY_TIMEOUT value `{}`", value))?,
            None => DEFAULT_PROXY_TIMEOUT_SECS,
        };
        let env_body_size = match lookup("ONYX_BRIDGE_MAX_BODY_SIZE") {
            Some(value) => value
                .parse::<usize>()
                .with_context(|| format!("parsing ONYX_BRIDGE_MAX_BODY_SIZE value `{}`", value))?,
            None => DEFAULT_MAX_BODY_SIZE,
        };
        let env_base = lookup("ONYX_BRIDGE_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let env_downloads = lookup("ONYX_BRIDGE_DOWNLOADS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./s3_downloads"));
        let env_workspace = lookup("ONYX_BRIDGE_WORKSPACE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let env_region = lookup("AWS_REGION").unwrap_or_else(|| "us-east-1".into());

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            base_url: normalize_base_url(&args.base_url.unwrap_or(env_base)),
            downloads_dir: args.downloads_dir.unwrap_or(env_downloads),
            workspace_dir: args.workspace_dir.unwrap_or(env_workspace),
            proxy_timeout: Duration::from_secs(args.proxy_timeout.unwrap_or(env_timeout)),
            max_body_size: args.max_body_size.unwrap_or(env_body_size),
            s3_region: args.s3_region.unwrap_or(env_region),
            access_token: non_empty(args.token.or_else(|| lookup("ONYX_BRIDGE_TOKEN")))
                .map(Secret::new),
            onyx: OnyxCredentials::from_parts(lookup("ONYX_DOMAIN"), lookup("ONYX_TOKEN")),
            store: StoreCredentials::from_parts(
                lookup("AWS_ACCESS_KEY_ID"),
                lookup("AWS_SECRET_ACCESS_KEY"),
                lookup("JUPYTERLAB_S3_ENDPOINT"),
            ),
        };

        Ok(cfg)
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// `"climb-onyx-gui/"` -> `"/climb-onyx-gui"`, `"/"` -> `""`.
fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}
