use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address to bind the server to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind the server to
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Directory for rolling log files
    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    /// Origin of the upstream catalog API
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Entries per list page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Seconds a cached query stays fresh
    #[serde(default = "default_stale_secs")]
    pub stale_secs: u64,

    /// Total fetch attempts before a failure is surfaced
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3040
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_api_base() -> String {
    dexview_core::DEFAULT_API_BASE.to_string()
}

fn default_page_size() -> u32 {
    12
}

fn default_stale_secs() -> u64 {
    5 * 60
}

fn default_retry_attempts() -> u32 {
    3
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_dir: default_log_dir(),
            api_base: default_api_base(),
            page_size: default_page_size(),
            stale_secs: default_stale_secs(),
            retry_attempts: default_retry_attempts(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file; a missing file falls back to
    /// defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("Config file '{}' not found, using defaults", path);
                return Ok(Config::default());
            }
            Err(e) => {
                return Err(anyhow::anyhow!("Failed to read config file '{}': {}", path, e));
            }
        };

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file: {}", e))?;

        Ok(config)
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
