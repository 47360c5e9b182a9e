//! Application settings and the resolved server configuration.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use campus::outbound::cache::RedisRefreshTokenStore;
use campus::outbound::persistence::DbPool;
use ortho_config::OrthoConfig;
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::Deserialize;
use tracing::warn;
use zeroize::Zeroizing;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_UPLOAD_ROOT: &str = "public";
const DEFAULT_FFPROBE: &str = "ffprobe";
const DEFAULT_POOL_SIZE: u32 = 10;
const EPHEMERAL_SECRET_LEN: usize = 48;

/// Settings read from `CAMPUS_*` environment variables and the command line.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CAMPUS")]
pub struct AppConfig {
    /// Socket address the HTTP listener binds.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. Without it every repository is in-memory.
    pub database_url: Option<String>,
    /// Redis URL for refresh tokens. Without it they live in memory.
    pub redis_url: Option<String>,
    /// HMAC secret for access tokens.
    pub access_token_secret: Option<String>,
    /// HMAC secret for refresh tokens.
    pub refresh_token_secret: Option<String>,
    /// Prefix for public upload URLs.
    pub public_base_url: Option<String>,
    /// Directory uploads are stored under.
    pub upload_root: Option<PathBuf>,
    /// `ffprobe` binary used to measure episode videos.
    pub ffprobe_path: Option<PathBuf>,
    /// Maximum database connections.
    pub db_pool_size: Option<u32>,
    /// Allow generated token secrets outside debug builds.
    #[ortho_config(default = false)]
    pub allow_ephemeral_secrets: bool,
}

impl AppConfig {
    /// Parsed bind address, falling back to `0.0.0.0:8080`.
    ///
    /// # Errors
    ///
    /// Returns [`std::io::ErrorKind::InvalidInput`] for an unparsable address.
    pub fn bind_addr(&self) -> std::io::Result<SocketAddr> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid bind address {raw}: {err}"),
            )
        })
    }

    pub fn public_base_url(&self) -> &str {
        self.public_base_url
            .as_deref()
            .unwrap_or(DEFAULT_PUBLIC_BASE_URL)
    }

    pub fn upload_root(&self) -> PathBuf {
        self.upload_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_ROOT))
    }

    pub fn ffprobe_path(&self) -> PathBuf {
        self.ffprobe_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FFPROBE))
    }

    pub fn db_pool_size(&self) -> u32 {
        self.db_pool_size.unwrap_or(DEFAULT_POOL_SIZE)
    }

    /// Access and refresh token secrets.
    ///
    /// Missing secrets are generated per process in debug builds or when
    /// `allow_ephemeral_secrets` is set; tokens then stop verifying after a
    /// restart.
    ///
    /// # Errors
    ///
    /// Returns an error naming the variable when a secret is missing and
    /// generated secrets are not allowed.
    pub fn token_secrets(&self) -> std::io::Result<(Zeroizing<String>, Zeroizing<String>)> {
        let allow_generated = cfg!(debug_assertions) || self.allow_ephemeral_secrets;
        let access = resolve_secret(
            self.access_token_secret.as_deref(),
            "CAMPUS_ACCESS_TOKEN_SECRET",
            allow_generated,
        )?;
        let refresh = resolve_secret(
            self.refresh_token_secret.as_deref(),
            "CAMPUS_REFRESH_TOKEN_SECRET",
            allow_generated,
        )?;
        Ok((access, refresh))
    }
}

fn resolve_secret(
    configured: Option<&str>,
    variable: &str,
    allow_generated: bool,
) -> std::io::Result<Zeroizing<String>> {
    match configured.map(str::trim).filter(|value| !value.is_empty()) {
        Some(secret) => Ok(Zeroizing::new(secret.to_owned())),
        None if allow_generated => {
            warn!(variable, "using generated token secret (dev only)");
            Ok(generate_secret())
        }
        None => Err(std::io::Error::other(format!("{variable} must be set"))),
    }
}

fn generate_secret() -> Zeroizing<String> {
    Zeroizing::new(
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(EPHEMERAL_SECRET_LEN)
            .map(char::from)
            .collect(),
    )
}

/// Resolved configuration handed to `create_server`.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) public_base_url: String,
    pub(crate) upload_root: PathBuf,
    pub(crate) ffprobe_path: PathBuf,
    pub(crate) access_secret: Zeroizing<String>,
    pub(crate) refresh_secret: Zeroizing<String>,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) refresh_store: Option<RedisRefreshTokenStore>,
}

impl ServerConfig {
    /// Configuration with in-memory adapters and the given token secrets.
    #[must_use]
    pub fn new(
        bind_addr: SocketAddr,
        access_secret: Zeroizing<String>,
        refresh_secret: Zeroizing<String>,
    ) -> Self {
        Self {
            bind_addr,
            public_base_url: DEFAULT_PUBLIC_BASE_URL.to_owned(),
            upload_root: PathBuf::from(DEFAULT_UPLOAD_ROOT),
            ffprobe_path: PathBuf::from(DEFAULT_FFPROBE),
            access_secret,
            refresh_secret,
            db_pool: None,
            refresh_store: None,
        }
    }

    #[must_use]
    pub fn with_public_base_url(mut self, url: impl Into<String>) -> Self {
        self.public_base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_upload_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.upload_root = root.into();
        self
    }

    #[must_use]
    pub fn with_ffprobe_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ffprobe_path = path.into();
        self
    }

    /// Back every repository with PostgreSQL.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Keep refresh tokens in Redis.
    #[must_use]
    pub fn with_refresh_store(mut self, store: RedisRefreshTokenStore) -> Self {
        self.refresh_store = Some(store);
        self
    }

    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    /// Directory multipart files are spooled into before storage moves them.
    ///
    /// It sits inside the upload root so the final move is a rename on the
    /// same filesystem.
    #[must_use]
    pub fn upload_scratch(&self) -> PathBuf {
        self.upload_root.join(".incoming")
    }

    #[must_use]
    pub fn upload_root(&self) -> &Path {
        &self.upload_root
    }
}
