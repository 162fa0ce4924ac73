use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory with the render surface bundle, served as fallback.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    /// Open dashboard sessions kept at once; the least recently used goes first.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
    /// Sessions untouched for longer than this are dropped.
    #[serde(default = "default_session_idle_minutes")]
    pub session_idle_minutes: i64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DatasetConfig {
    /// Fixed RNG seed for reproducible synthetic data. Entropy when absent.
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info,tower_http=warn".to_string(),
        }
    }
}

fn default_static_dir() -> String {
    "dist".to_string()
}

fn default_max_sessions() -> usize {
    1000
}

fn default_session_idle_minutes() -> i64 {
    30
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
host = "0.0.0.0"
port = 3000
static_dir = "dist"
max_sessions = 1000
session_idle_minutes = 30

[log]
filter = "info,tower_http=warn"
"#;

/// Configuration plus the file it came from (`None` = embedded default).
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub source: Option<PathBuf>,
}

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable
/// 2. Falls back to embedded default config
///
/// Runs before tracing is up, so the caller logs `source`.
pub fn load_config() -> anyhow::Result<LoadedConfig> {
    load_config_in(exe_dir().as_deref())
}

pub fn load_config_in(dir: Option<&Path>) -> anyhow::Result<LoadedConfig> {
    if let Some(config_path) = dir.map(|dir| dir.join("config.toml")) {
        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            return Ok(LoadedConfig {
                config: parse_config(&contents)?,
                source: Some(config_path),
            });
        }
    }

    Ok(LoadedConfig {
        config: parse_config(DEFAULT_CONFIG)?,
        source: None,
    })
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let config: Config = toml::from_str(contents)?;
    Ok(config)
}

impl ServerConfig {
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port).parse()?;
        Ok(addr)
    }
}

/// Directory of the running executable, if it can be resolved.
pub fn exe_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|d| d.to_path_buf()))
}
