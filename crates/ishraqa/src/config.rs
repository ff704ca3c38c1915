use anyhow::{Context, Result};
use ishraqa_search::request::{DEFAULT_HITS_PER_PAGE, DEFAULT_INDEX};
use ishraqa_search::ClientConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub backend: ClientConfig,

    #[serde(default)]
    pub search: SearchSettings,

    #[serde(default)]
    pub gateway: GatewaySettings,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SearchSettings {
    #[serde(default = "default_index")]
    pub index: String,

    #[serde(default = "default_hits_per_page")]
    pub hits_per_page: usize,

    #[serde(default)]
    pub sort: Option<String>,

    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct GatewaySettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: u32,

    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

fn default_index() -> String {
    DEFAULT_INDEX.to_string()
}

fn default_hits_per_page() -> usize {
    DEFAULT_HITS_PER_PAGE
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_rate_limit() -> u32 {
    120
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            index: default_index(),
            hits_per_page: default_hits_per_page(),
            sort: None,
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            rate_limit_per_minute: default_rate_limit(),
            allowed_origins: Vec::new(),
        }
    }
}

/// Load config from file or use defaults, then apply `ISHRAQA_*` overrides
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => parse_file(path)?,
        None => Config::default(),
    };
    config.backend.apply_env(|key| std::env::var(key).ok());
    Ok(config)
}

fn parse_file(path: &Path) -> Result<Config> {
    let expanded = shellexpand::tilde(&path.to_string_lossy()).to_string();
    let content = fs::read_to_string(&expanded)
        .context(format!("Failed to read config file: {:?}", expanded))?;
    toml::from_str(&content).context("Failed to parse TOML config")
}
