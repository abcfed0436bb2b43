use clap::{Parser, ValueEnum};
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::time::Duration;
use url::Url;

pub const LISTEN_ADDR_ENV: &str = "PINHOLE_LISTEN_ADDR";
pub const BASE_URL_ENV: &str = "PINHOLE_BASE_URL";
pub const STORAGE_BACKEND_ENV: &str = "PINHOLE_STORAGE";
pub const SQLITE_URL_ENV: &str = "PINHOLE_SQLITE_URL";
pub const GENERATOR_ENV: &str = "PINHOLE_GENERATOR";
pub const CODE_LENGTH_ENV: &str = "PINHOLE_CODE_LENGTH";
pub const SEQ_OFFSET_ENV: &str = "PINHOLE_SEQ_OFFSET";
pub const MAX_ATTEMPTS_ENV: &str = "PINHOLE_MAX_ATTEMPTS";
pub const CACHE_CAPACITY_ENV: &str = "PINHOLE_CACHE_CAPACITY";
pub const REQUEST_TIMEOUT_MS_ENV: &str = "PINHOLE_REQUEST_TIMEOUT_MS";
pub const LOG_FORMAT_ENV: &str = "PINHOLE_LOG_FORMAT";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_CODE_LENGTH: &str = "7";
pub const DEFAULT_MAX_ATTEMPTS: &str = "5";
pub const DEFAULT_CACHE_CAPACITY: &str = "10000";
pub const DEFAULT_REQUEST_TIMEOUT_MS: &str = "5000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "sqlite")]
    Sqlite,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Sqlite => write!(f, "sqlite"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GeneratorArg {
    /// Uniformly random base62 codes.
    Random,
    /// Permuted counter, collision free within one process.
    Seq,
}

impl Display for GeneratorArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            GeneratorArg::Random => write!(f, "random"),
            GeneratorArg::Seq => write!(f, "seq"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Plain,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "pinhole", about = "URL shortener HTTP server")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Public origin prepended to every short code, e.g. `https://short.ly`.
    #[arg(long, env = BASE_URL_ENV, value_parser = parse_base_url)]
    pub base_url: Url,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = SQLITE_URL_ENV, required_if_eq("storage", "sqlite"))]
    pub sqlite_url: Option<String>,

    #[arg(
        long,
        env = GENERATOR_ENV,
        value_enum,
        default_value_t = GeneratorArg::Random
    )]
    pub generator: GeneratorArg,

    #[arg(
        long,
        env = CODE_LENGTH_ENV,
        default_value = DEFAULT_CODE_LENGTH,
        value_parser = clap::value_parser!(u8).range(6..=8)
    )]
    pub code_length: u8,

    /// Starting counter for the `seq` generator; set it past the last value
    /// used when restarting against a persistent store.
    #[arg(long, env = SEQ_OFFSET_ENV, default_value_t = 0)]
    pub seq_offset: u64,

    #[arg(
        long,
        env = MAX_ATTEMPTS_ENV,
        default_value = DEFAULT_MAX_ATTEMPTS,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub max_attempts: u32,

    /// Resolve cache size in entries; 0 disables caching.
    #[arg(long, env = CACHE_CAPACITY_ENV, default_value = DEFAULT_CACHE_CAPACITY)]
    pub cache_capacity: u64,

    #[arg(
        long,
        env = REQUEST_TIMEOUT_MS_ENV,
        default_value = DEFAULT_REQUEST_TIMEOUT_MS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub request_timeout_ms: u64,

    #[arg(
        long,
        env = LOG_FORMAT_ENV,
        value_enum,
        default_value_t = LogFormatArg::Plain
    )]
    pub log_format: LogFormatArg,
}

impl CLI {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn parse_base_url(value: &str) -> Result<Url, String> {
    let url = Url::parse(value).map_err(|e| format!("invalid base url: {}", e))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("base url must be http or https, got {}", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("base url must have a host".to_string());
    }
    Ok(url)
}
