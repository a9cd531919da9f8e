//! Configuration module
//!
//! All settings are environment-sourced (a `.env` file is honoured when present)
//! and validated once at startup. A process that cannot build a valid `Config`
//! refuses to start.

use std::env;
use std::time::Duration;

use crate::storage_types::StorageBackend;

// Common constants
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_LOCAL_PATH: &str = "./uploads";
const DEFAULT_S3_BUCKET: &str = "go-upload";
const DEFAULT_S3_PREFIX: &str = "uploads";
const DEFAULT_TURNSTILE_VERIFY_URL: &str =
    "https://challenges.cloudflare.com/turnstile/v0/siteverify";
const TURNSTILE_TIMEOUT_SECS: u64 = 10;
const UPLOAD_TIMEOUT_SECS: u64 = 4 * 60;
const READ_TIMEOUT_SECS: u64 = 5 * 60;
const MAX_TIMEOUT_SECS: u64 = 24 * 60 * 60;

/// Console log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    server_port: u16,
    environment: String,
    log_format: LogFormat,
    // Storage configuration
    storage_backend: StorageBackend,
    local_storage_path: String,
    s3_bucket: String,
    s3_prefix: String,
    s3_region: Option<String>,
    s3_endpoint: Option<String>,
    // CAPTCHA configuration
    turnstile_secret: String,
    turnstile_site_key: String,
    turnstile_verify_url: String,
    turnstile_timeout_secs: u64,
    // Upload handling
    upload_timeout_secs: u64,
    read_timeout_secs: u64,
    trusted_proxy_count: usize,
}

impl Config {
    /// Load configuration from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let environment = var("ENVIRONMENT")
            .or_else(|| var("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let log_format = match var("LOG_FORMAT").map(|s| s.to_lowercase()).as_deref() {
            None | Some("compact") => LogFormat::Compact,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(anyhow::anyhow!(
                    "LOG_FORMAT must be 'compact' or 'json', got '{}'",
                    other
                ))
            }
        };

        let storage_backend = match var("BACKEND") {
            Some(value) => value.parse::<StorageBackend>()?,
            None => StorageBackend::Local,
        };

        let config = Config {
            server_port: parse_var(&var, "PORT")?.unwrap_or(DEFAULT_PORT),
            environment,
            log_format,
            storage_backend,
            local_storage_path: var("LOCAL_PATH").unwrap_or_else(|| DEFAULT_LOCAL_PATH.to_string()),
            s3_bucket: var("S3_BUCKET").unwrap_or_else(|| DEFAULT_S3_BUCKET.to_string()),
            s3_prefix: var("S3_PREFIX").unwrap_or_else(|| DEFAULT_S3_PREFIX.to_string()),
            s3_region: var("S3_REGION").or_else(|| var("AWS_REGION")),
            s3_endpoint: var("S3_ENDPOINT"),
            turnstile_secret: var("TURNSTILE_SECRET").ok_or_else(|| {
                anyhow::anyhow!("TURNSTILE_SECRET environment variable is not set")
            })?,
            turnstile_site_key: var("TURNSTILE_SITEKEY")
                .ok_or_else(|| anyhow::anyhow!("TURNSTILE_SITEKEY is not set"))?,
            turnstile_verify_url: var("TURNSTILE_VERIFY_URL")
                .unwrap_or_else(|| DEFAULT_TURNSTILE_VERIFY_URL.to_string()),
            turnstile_timeout_secs: parse_var(&var, "TURNSTILE_TIMEOUT_SECS")?
                .unwrap_or(TURNSTILE_TIMEOUT_SECS),
            upload_timeout_secs: parse_var(&var, "UPLOAD_TIMEOUT_SECS")?
                .unwrap_or(UPLOAD_TIMEOUT_SECS),
            read_timeout_secs: parse_var(&var, "READ_TIMEOUT_SECS")?.unwrap_or(READ_TIMEOUT_SECS),
            trusted_proxy_count: parse_var(&var, "TRUSTED_PROXY_COUNT")?.unwrap_or(0),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.turnstile_site_key.is_empty()
            || !self
                .turnstile_site_key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(anyhow::anyhow!(
                "TURNSTILE_SITEKEY may only contain ASCII letters, digits, '_' and '-'"
            ));
        }

        for (name, secs) in [
            ("TURNSTILE_TIMEOUT_SECS", self.turnstile_timeout_secs),
            ("UPLOAD_TIMEOUT_SECS", self.upload_timeout_secs),
            ("READ_TIMEOUT_SECS", self.read_timeout_secs),
        ] {
            if secs == 0 || secs > MAX_TIMEOUT_SECS {
                return Err(anyhow::anyhow!(
                    "{} must be between 1 and {} seconds, got {}",
                    name,
                    MAX_TIMEOUT_SECS,
                    secs
                ));
            }
        }

        match self.storage_backend {
            StorageBackend::Local => {
                if self.local_storage_path.trim().is_empty() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_PATH must be set when using local storage backend"
                    ));
                }
            }
            StorageBackend::S3 => {
                if self.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn server_port(&self) -> u16 {
        self.server_port
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.storage_backend
    }

    pub fn local_storage_path(&self) -> &str {
        &self.local_storage_path
    }

    pub fn s3_bucket(&self) -> &str {
        &self.s3_bucket
    }

    pub fn s3_prefix(&self) -> &str {
        &self.s3_prefix
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.s3_endpoint.as_deref()
    }

    pub fn turnstile_secret(&self) -> &str {
        &self.turnstile_secret
    }

    pub fn turnstile_site_key(&self) -> &str {
        &self.turnstile_site_key
    }

    pub fn turnstile_verify_url(&self) -> &str {
        &self.turnstile_verify_url
    }

    pub fn turnstile_timeout(&self) -> Duration {
        Duration::from_secs(self.turnstile_timeout_secs)
    }

    /// Ceiling on one upload session, measured from deadline establishment.
    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }

    /// Longest a request body may sit idle before the transport gives up on it.
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn trusted_proxy_count(&self) -> usize {
        self.trusted_proxy_count
    }
}

/// Parse an optional numeric variable; a present but unparsable value is an error.
fn parse_var<T, F>(var: &F, key: &str) -> Result<Option<T>, anyhow::Error>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    var(key)
        .map(|value| {
            value.trim().parse::<T>().map_err(|_| {
                anyhow::anyhow!("{} must be a valid non-negative number, got '{}'", key, value)
            })
        })
        .transpose()
}
