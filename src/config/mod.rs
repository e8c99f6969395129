//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{
    net::SocketAddr,
    num::{NonZeroU64, NonZeroUsize},
    path::PathBuf,
    str::FromStr,
};

use clap::{Args, Parser, ValueHint, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "favella";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_CACHE_CAPACITY: usize = 50;
const DEFAULT_LOCAL_TTL_SECS: u64 = 600;
const DEFAULT_REMOTE_TTL_SECS: u64 = 1800;
const DEFAULT_REMOTE_OP_TIMEOUT_MS: u64 = 2000;
const DEFAULT_CONCURRENCY_LIMIT: usize = 2;
const DEFAULT_REMOTE_URL: &str = "redis://127.0.0.1:6379";

/// Command-line arguments for the Favella binary.
#[derive(Debug, Parser)]
#[command(name = "favella", version, about = "Localized component artifact server")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "FAVELLA_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: Overrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct Overrides {
    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the local cache capacity.
    #[arg(long = "cache-capacity", value_name = "COUNT")]
    pub cache_capacity: Option<usize>,

    /// Override the local cache TTL.
    #[arg(long = "cache-ttl-seconds", value_name = "SECONDS")]
    pub cache_ttl_seconds: Option<u64>,

    /// Override the remote tier TTL.
    #[arg(long = "cache-remote-ttl-seconds", value_name = "SECONDS")]
    pub cache_remote_ttl_seconds: Option<u64>,

    /// Override the per-operation remote tier timeout.
    #[arg(long = "cache-remote-timeout-ms", value_name = "MILLIS")]
    pub cache_remote_timeout_ms: Option<u64>,

    /// Override the admission gate concurrency limit.
    #[arg(long = "cache-concurrency-limit", value_name = "COUNT")]
    pub cache_concurrency_limit: Option<usize>,

    /// Override the remote tier connection URL.
    #[arg(long = "remote-url", value_name = "URL")]
    pub remote_url: Option<String>,

    /// Toggle the remote tier entirely.
    #[arg(
        long = "remote-enabled",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub remote_enabled: Option<bool>,

    /// Override the registry file path.
    #[arg(long = "registry-file", value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub registry_file: Option<PathBuf>,
}

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub cache: CacheSettings,
    pub remote: RemoteSettings,
    pub registry: RegistrySettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub listen_addr: SocketAddr,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub capacity: NonZeroUsize,
    pub local_ttl_secs: NonZeroU64,
    pub remote_ttl_secs: NonZeroU64,
    pub remote_op_timeout_ms: NonZeroU64,
    pub concurrency_limit: NonZeroUsize,
}

#[derive(Debug, Clone)]
pub struct RemoteSettings {
    /// Redis connection URL carrying address, credential, and database
    /// index (`redis://:password@host:port/db`).
    pub url: String,
    pub enabled: bool,
}

#[derive(Debug, Clone)]
pub struct RegistrySettings {
    /// Optional TOML registry file; the built-in registry is used when
    /// absent.
    pub file: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("FAVELLA").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(&cli.overrides);

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    cache: RawCacheSettings,
    remote: RawRemoteSettings,
    registry: RawRegistrySettings,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    capacity: Option<usize>,
    local_ttl_secs: Option<u64>,
    remote_ttl_secs: Option<u64>,
    remote_op_timeout_ms: Option<u64>,
    concurrency_limit: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawRemoteSettings {
    url: Option<String>,
    enabled: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawRegistrySettings {
    file: Option<PathBuf>,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(capacity) = overrides.cache_capacity {
            self.cache.capacity = Some(capacity);
        }
        if let Some(seconds) = overrides.cache_ttl_seconds {
            self.cache.local_ttl_secs = Some(seconds);
        }
        if let Some(seconds) = overrides.cache_remote_ttl_seconds {
            self.cache.remote_ttl_secs = Some(seconds);
        }
        if let Some(millis) = overrides.cache_remote_timeout_ms {
            self.cache.remote_op_timeout_ms = Some(millis);
        }
        if let Some(limit) = overrides.cache_concurrency_limit {
            self.cache.concurrency_limit = Some(limit);
        }
        if let Some(url) = overrides.remote_url.as_ref() {
            self.remote.url = Some(url.clone());
        }
        if let Some(enabled) = overrides.remote_enabled {
            self.remote.enabled = Some(enabled);
        }
        if let Some(file) = overrides.registry_file.as_ref() {
            self.registry.file = Some(file.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            cache,
            remote,
            registry,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            logging: build_logging_settings(logging)?,
            cache: build_cache_settings(cache)?,
            remote: build_remote_settings(remote),
            registry: RegistrySettings {
                file: registry.file,
            },
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let listen_addr = format!("{host}:{port}")
        .parse::<SocketAddr>()
        .map_err(|err| LoadError::invalid("server.listen_addr", err.to_string()))?;

    Ok(ServerSettings { listen_addr })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheSettings, LoadError> {
    let capacity = non_zero_usize(
        cache.capacity.unwrap_or(DEFAULT_CACHE_CAPACITY),
        "cache.capacity",
    )?;
    let local_ttl_secs = non_zero_u64(
        cache.local_ttl_secs.unwrap_or(DEFAULT_LOCAL_TTL_SECS),
        "cache.local_ttl_secs",
    )?;
    let remote_ttl_secs = non_zero_u64(
        cache.remote_ttl_secs.unwrap_or(DEFAULT_REMOTE_TTL_SECS),
        "cache.remote_ttl_secs",
    )?;
    let remote_op_timeout_ms = non_zero_u64(
        cache
            .remote_op_timeout_ms
            .unwrap_or(DEFAULT_REMOTE_OP_TIMEOUT_MS),
        "cache.remote_op_timeout_ms",
    )?;
    let concurrency_limit = non_zero_usize(
        cache.concurrency_limit.unwrap_or(DEFAULT_CONCURRENCY_LIMIT),
        "cache.concurrency_limit",
    )?;

    // The tiers form a fast/short, slow/long hierarchy; a remote TTL
    // at or below the local one would invert it.
    if remote_ttl_secs.get() <= local_ttl_secs.get() {
        return Err(LoadError::invalid(
            "cache.remote_ttl_secs",
            "must be greater than cache.local_ttl_secs",
        ));
    }

    Ok(CacheSettings {
        capacity,
        local_ttl_secs,
        remote_ttl_secs,
        remote_op_timeout_ms,
        concurrency_limit,
    })
}

fn build_remote_settings(remote: RawRemoteSettings) -> RemoteSettings {
    RemoteSettings {
        url: remote.url.unwrap_or_else(|| DEFAULT_REMOTE_URL.to_string()),
        enabled: remote.enabled.unwrap_or(true),
    }
}

fn non_zero_usize(value: usize, key: &'static str) -> Result<NonZeroUsize, LoadError> {
    NonZeroUsize::new(value).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}

fn non_zero_u64(value: u64, key: &'static str) -> Result<NonZeroU64, LoadError> {
    NonZeroU64::new(value).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}

#[cfg(test)]
mod tests;
