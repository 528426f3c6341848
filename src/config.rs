use crate::convert::ConvertOptions;
use crate::uri::{DEFAULT_BASE_URL, is_absolute};
use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_CACHE_CAPACITY: usize = 256;
const DEFAULT_HTTP_PORT: u16 = 8080;
const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Vocabulary file; the bundled vocabulary is served when unset.
    pub vocabulary_path: Option<PathBuf>,
    pub base_url: String,
    pub pretty: bool,
    pub cache_capacity: usize,
    pub http_bind_address: SocketAddr,
    pub shutdown_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            vocabulary_path: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            pretty: true,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            http_bind_address: default_bind_address(),
            shutdown_timeout: Duration::from_secs(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
        }
    }
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_HTTP_PORT))
}

impl ServerConfig {
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let CliArgs {
            config,
            vocabulary: cli_vocabulary,
            base_url: cli_base_url,
            pretty: cli_pretty,
            cache_capacity: cli_cache_capacity,
            http_bind: cli_http_bind,
            shutdown_timeout: cli_shutdown_timeout,
        } = args;

        let file_config = if let Some(path) = config.as_ref() {
            load_config_file(path)?
        } else {
            PartialConfig::default()
        };

        let PartialConfig {
            vocabulary: file_vocabulary,
            base_url: file_base_url,
            pretty: file_pretty,
            cache_capacity: file_cache_capacity,
            http_bind: file_http_bind,
            shutdown_timeout_secs: file_shutdown_timeout,
        } = file_config;

        let defaults = Self::default();

        let vocabulary_path = cli_vocabulary.or(file_vocabulary).map(|path| {
            match config.as_ref().and_then(|c| c.parent()) {
                // Paths in a config file are relative to that file.
                Some(dir) if path.is_relative() && !dir.as_os_str().is_empty() => dir.join(path),
                _ => path,
            }
        });

        let base_url = cli_base_url
            .or(file_base_url)
            .map(|url| url.trim().to_string())
            .unwrap_or(defaults.base_url);

        let cache_capacity = cli_cache_capacity
            .or(file_cache_capacity)
            .unwrap_or(defaults.cache_capacity)
            .max(1);

        let shutdown_timeout = cli_shutdown_timeout
            .or(file_shutdown_timeout)
            .map(Duration::from_secs)
            .unwrap_or(defaults.shutdown_timeout);

        Ok(Self {
            vocabulary_path,
            base_url,
            pretty: cli_pretty.or(file_pretty).unwrap_or(defaults.pretty),
            cache_capacity,
            http_bind_address: cli_http_bind
                .or(file_http_bind)
                .unwrap_or(defaults.http_bind_address),
            shutdown_timeout,
        })
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            is_absolute(&self.base_url),
            "base url {:?} must start with http:// or https://",
            self.base_url
        );
        anyhow::ensure!(
            self.base_url.ends_with('/'),
            "base url {:?} must end with '/'",
            self.base_url
        );
        if let Some(path) = self.vocabulary_path.as_ref() {
            anyhow::ensure!(path.exists(), "vocabulary file {:?} does not exist", path);
            anyhow::ensure!(path.is_file(), "vocabulary file {:?} is not a file", path);
        }
        Ok(())
    }

    pub fn convert_options(&self) -> ConvertOptions {
        ConvertOptions::new(self.base_url.clone()).pretty(self.pretty)
    }
}

#[derive(Parser, Debug, Default, Clone)]
#[command(
    name = "oerschema",
    about = "Serves the OER vocabulary in RDF and JSON formats",
    version
)]
pub struct CliArgs {
    #[arg(
        long,
        value_name = "FILE",
        help = "Path to a configuration file (YAML or JSON)",
        global = true
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        env = "OERSCHEMA_VOCABULARY",
        value_name = "FILE",
        help = "Vocabulary definition (YAML or JSON); defaults to the bundled vocabulary"
    )]
    pub vocabulary: Option<PathBuf>,

    #[arg(
        long,
        env = "OERSCHEMA_BASE_URL",
        value_name = "URL",
        help = "Namespace local terms resolve against (must end with '/')"
    )]
    pub base_url: Option<String>,

    #[arg(
        long,
        env = "OERSCHEMA_PRETTY",
        value_name = "BOOL",
        help = "Indent JSON responses",
        value_parser = clap::value_parser!(bool)
    )]
    pub pretty: Option<bool>,

    #[arg(
        long,
        env = "OERSCHEMA_CACHE_CAPACITY",
        value_name = "N",
        help = "Maximum number of rendered documents kept in memory",
        value_parser = clap::value_parser!(usize)
    )]
    pub cache_capacity: Option<usize>,

    #[arg(
        long,
        env = "OERSCHEMA_HTTP_BIND",
        value_name = "ADDR",
        help = "HTTP bind address"
    )]
    pub http_bind: Option<SocketAddr>,

    #[arg(
        long,
        env = "OERSCHEMA_SHUTDOWN_TIMEOUT",
        value_name = "SECS",
        help = "Seconds to drain in-flight requests on shutdown",
        value_parser = clap::value_parser!(u64)
    )]
    pub shutdown_timeout: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialConfig {
    vocabulary: Option<PathBuf>,
    base_url: Option<String>,
    pretty: Option<bool>,
    cache_capacity: Option<usize>,
    http_bind: Option<SocketAddr>,
    shutdown_timeout_secs: Option<u64>,
}

fn load_config_file(path: &Path) -> Result<PartialConfig> {
    if !path.exists() {
        anyhow::bail!("config file {:?} does not exist", path);
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {:?}", path))?;
    let ext = path
        .extension()
        .and_then(|os| os.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse YAML config {:?}", path))?,
        "json" => serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse JSON config {:?}", path))?,
        other => anyhow::bail!("unsupported config extension: {other}"),
    };
    Ok(parsed)
}
