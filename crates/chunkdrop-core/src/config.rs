//! Configuration module
//!
//! Uploader settings loaded from the environment (and `.env`). CLI flags
//! override individual values after loading.

use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::constants::{DEFAULT_CHUNK_SIZE_BYTES, DEFAULT_UPLOAD_ENDPOINT, MIB};

const HTTP_TIMEOUT_SECS: u64 = 60;

/// How uploads of different files relate to each other.
///
/// Chunks of one file are always sent one at a time; this only decides whether
/// several files may be in flight together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileConcurrency {
    /// One file after another, in input order.
    Sequential,
    /// At most N files in flight.
    Bounded(usize),
    /// Every file starts immediately.
    Unbounded,
}

impl FileConcurrency {
    /// Maximum number of files in flight, `None` when unlimited.
    pub fn limit(&self) -> Option<usize> {
        match self {
            FileConcurrency::Sequential => Some(1),
            FileConcurrency::Bounded(n) => Some(*n),
            FileConcurrency::Unbounded => None,
        }
    }
}

impl FromStr for FileConcurrency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sequential" | "serial" => Ok(FileConcurrency::Sequential),
            "unbounded" | "unlimited" => Ok(FileConcurrency::Unbounded),
            other => other
                .parse::<usize>()
                .map_err(|_| {
                    anyhow::anyhow!(
                        "Invalid file concurrency: {}. Must be 'sequential', 'unbounded' or a number",
                        s
                    )
                })
                .and_then(|n| {
                    if n == 0 {
                        Err(anyhow::anyhow!("File concurrency must be greater than 0"))
                    } else {
                        Ok(FileConcurrency::Bounded(n))
                    }
                }),
        }
    }
}

impl Display for FileConcurrency {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            FileConcurrency::Sequential => write!(f, "sequential"),
            FileConcurrency::Bounded(n) => write!(f, "{}", n),
            FileConcurrency::Unbounded => write!(f, "unbounded"),
        }
    }
}

/// Uploader configuration
#[derive(Clone, Debug)]
pub struct UploaderConfig {
    pub endpoint: String,
    pub chunk_size_bytes: u64,
    pub file_concurrency: FileConcurrency,
    pub http_timeout_secs: u64,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_UPLOAD_ENDPOINT.to_string(),
            chunk_size_bytes: DEFAULT_CHUNK_SIZE_BYTES,
            // every file starts at once unless configured otherwise
            file_concurrency: FileConcurrency::Unbounded,
            http_timeout_secs: HTTP_TIMEOUT_SECS,
        }
    }
}

impl UploaderConfig {
    /// Load from `CHUNKDROP_*` environment variables, reading `.env` first.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Unset variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let endpoint = lookup("CHUNKDROP_ENDPOINT")
            .map(|s| s.trim().to_string())
            .unwrap_or(defaults.endpoint);

        let chunk_size_bytes = match lookup("CHUNKDROP_CHUNK_SIZE_MB") {
            Some(raw) => {
                raw.trim()
                    .parse::<u64>()
                    .map_err(|_| anyhow::anyhow!("CHUNKDROP_CHUNK_SIZE_MB must be a valid number"))?
                    .saturating_mul(MIB)
            }
            None => defaults.chunk_size_bytes,
        };

        let file_concurrency = match lookup("CHUNKDROP_FILE_CONCURRENCY") {
            Some(raw) => raw.parse()?,
            None => defaults.file_concurrency,
        };

        let http_timeout_secs = match lookup("CHUNKDROP_HTTP_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                anyhow::anyhow!("CHUNKDROP_HTTP_TIMEOUT_SECS must be a valid number")
            })?,
            None => defaults.http_timeout_secs,
        };

        let config = Self {
            endpoint,
            chunk_size_bytes,
            file_concurrency,
            http_timeout_secs,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.endpoint.is_empty() {
            return Err(anyhow::anyhow!("CHUNKDROP_ENDPOINT must not be empty"));
        }

        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(anyhow::anyhow!(
                "CHUNKDROP_ENDPOINT must be an http:// or https:// URL"
            ));
        }

        if self.chunk_size_bytes == 0 {
            return Err(anyhow::anyhow!("Chunk size must be greater than 0"));
        }

        if self.file_concurrency == FileConcurrency::Bounded(0) {
            return Err(anyhow::anyhow!("File concurrency must be greater than 0"));
        }

        if self.http_timeout_secs == 0 {
            return Err(anyhow::anyhow!("HTTP timeout must be greater than 0"));
        }

        Ok(())
    }
}
