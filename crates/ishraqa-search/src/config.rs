use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://flipped.spicydonut.biz";
/// Public storefront key, used when no key is configured
pub const DEFAULT_API_KEY: &str = "ishraqa-public-storefront";

pub const ENV_BASE_URL: &str = "ISHRAQA_BASE_URL";
pub const ENV_API_KEY: &str = "ISHRAQA_API_KEY";
pub const ENV_DEBUG: &str = "ISHRAQA_DEBUG";

/// Backend connection settings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_api_key")]
    pub api_key: String,

    #[serde(default)]
    pub debug: bool,

    /// Request timeout; unset leaves the transport default in place
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_api_key() -> String {
    DEFAULT_API_KEY.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: default_api_key(),
            debug: false,
            timeout_secs: None,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `ISHRAQA_*` environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Override fields from an environment lookup; empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_BASE_URL) {
            self.base_url = url;
        }
        if let Some(key) = get(ENV_API_KEY) {
            self.api_key = key;
        }
        if let Some(flag) = get(ENV_DEBUG) {
            self.debug = parse_flag(&flag);
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    pub fn with_api_key(mut self, key: &str) -> Self {
        self.api_key = key.to_string();
        self
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
