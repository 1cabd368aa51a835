use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration from config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub list: ListConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Backend origin, e.g. `https://shop.example.com`
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Session cookie value issued by the auth server
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: default_base_url(),
            token: String::new(),
            cookie_name: default_cookie_name(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3001".to_string()
}

fn default_cookie_name() -> String {
    "token".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListConfig {
    #[serde(default = "default_per_page")]
    pub per_page: usize,
}

impl Default for ListConfig {
    fn default() -> Self {
        ListConfig {
            per_page: default_per_page(),
        }
    }
}

fn default_per_page() -> usize {
    20
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Prefix files with a UTF-8 BOM so spreadsheet apps pick the right encoding
    #[serde(default = "default_true")]
    pub bom: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            delimiter: default_delimiter(),
            bom: true,
        }
    }
}

fn default_delimiter() -> char {
    ','
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Hex overrides for theme colors, keyed by theme slot name
    #[serde(default)]
    pub colors: HashMap<String, String>,
    /// Show the key hint line at the bottom of the reorder screen
    #[serde(default = "default_true")]
    pub show_key_hints: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            colors: HashMap::new(),
            show_key_hints: true,
        }
    }
}
