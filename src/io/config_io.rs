use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::AppConfig;

/// Error type for config file operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("invalid config document: {0}")]
    DocumentError(#[from] toml_edit::TomlError),
    #[error("unknown config key: {0}")]
    UnknownKey(String),
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
    #[error("{0} already exists (use --force to overwrite)")]
    AlreadyExists(PathBuf),
}

/// Written by `config init`
pub const CONFIG_TEMPLATE: &str = r##"[api]
base_url = "http://localhost:3001"
# Session cookie value from the admin login
token = ""
cookie_name = "token"
timeout_secs = 30

[list]
per_page = 20

[export]
delimiter = ","
bom = true

[ui]
show_key_hints = true

[ui.colors]
# highlight = "#FB4196"
"##;

/// Directory holding config.toml and the TUI log, respecting XDG_CONFIG_HOME
pub fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| dirs_home().join(".config"));
    base.join("bakery-admin")
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
}

/// Resolve the config file: explicit path, then $BKA_CONFIG, then the XDG default
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    if let Ok(p) = std::env::var("BKA_CONFIG")
        && !p.is_empty()
    {
        return PathBuf::from(p);
    }
    config_dir().join("config.toml")
}

/// Read a config file. A missing file yields the defaults.
pub fn read_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let text = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(toml::from_str(&text)?)
}

/// Apply command-line and environment overrides. The flag wins over the env var.
pub fn apply_overrides(
    config: &mut AppConfig,
    api_url: Option<String>,
    env_api_url: Option<String>,
    env_token: Option<String>,
) {
    if let Some(url) = api_url.or(env_api_url).filter(|s| !s.trim().is_empty()) {
        config.api.base_url = url;
    }
    if let Some(token) = env_token.filter(|s| !s.trim().is_empty()) {
        config.api.token = token;
    }
}

/// Read the config at `path` and layer BKA_API_URL / BKA_TOKEN and `--api-url` on top
pub fn load_config(path: &Path, api_url: Option<String>) -> Result<AppConfig, ConfigError> {
    let mut config = read_config_from(path)?;
    apply_overrides(
        &mut config,
        api_url,
        std::env::var("BKA_API_URL").ok(),
        std::env::var("BKA_TOKEN").ok(),
    );
    Ok(config)
}

/// Read the raw document for round-trip-safe editing. Missing file → empty document.
pub fn read_document(path: &Path) -> Result<toml_edit::DocumentMut, ConfigError> {
    if !path.exists() {
        return Ok(toml_edit::DocumentMut::new());
    }
    let text = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(text.parse()?)
}

/// Write the document back, creating the parent directory if needed.
pub fn write_document(path: &Path, doc: &toml_edit::DocumentMut) -> Result<(), ConfigError> {
    let write_err = |e| ConfigError::WriteError {
        path: path.to_path_buf(),
        source: e,
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(path, doc.to_string()).map_err(write_err)
}

fn invalid(key: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn ensure_table<'a>(doc: &'a mut toml_edit::DocumentMut, name: &str) -> &'a mut toml_edit::Item {
    if !doc.contains_key(name) {
        doc[name] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    &mut doc[name]
}

/// Set a dotted key (`api.token`, `export.bom`, `ui.colors.highlight`, ...)
/// after checking the value has the right type.
pub fn set_value(doc: &mut toml_edit::DocumentMut, key: &str, raw: &str) -> Result<(), ConfigError> {
    let value = match key {
        "api.base_url" | "api.token" | "api.cookie_name" => {
            if key == "api.cookie_name" && raw.trim().is_empty() {
                return Err(invalid(key, "cookie name cannot be empty"));
            }
            toml_edit::value(raw)
        }
        "api.timeout_secs" => {
            let secs: i64 = raw
                .parse()
                .map_err(|_| invalid(key, "expected a whole number of seconds"))?;
            if secs < 1 {
                return Err(invalid(key, "must be at least 1"));
            }
            toml_edit::value(secs)
        }
        "list.per_page" => {
            let n: i64 = raw.parse().map_err(|_| invalid(key, "expected a number"))?;
            if n < 1 {
                return Err(invalid(key, "must be at least 1"));
            }
            toml_edit::value(n)
        }
        "export.delimiter" => {
            let mut chars = raw.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii() => toml_edit::value(raw),
                _ => return Err(invalid(key, "expected a single ASCII character")),
            }
        }
        "export.bom" | "ui.show_key_hints" => {
            let b: bool = raw
                .parse()
                .map_err(|_| invalid(key, "expected true or false"))?;
            toml_edit::value(b)
        }
        _ => {
            if let Some(slot) = key.strip_prefix("ui.colors.")
                && !slot.is_empty()
            {
                if crate::tui::theme::parse_hex_color(raw).is_none() {
                    return Err(invalid(key, "expected a hex color like #FB4196"));
                }
                let ui = ensure_table(doc, "ui");
                if ui.get("colors").is_none() {
                    ui["colors"] = toml_edit::Item::Table(toml_edit::Table::new());
                }
                ui["colors"][slot] = toml_edit::value(raw);
                return Ok(());
            }
            return Err(ConfigError::UnknownKey(key.to_string()));
        }
    };

    let (section, field) = key
        .split_once('.')
        .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
    ensure_table(doc, section)[field] = value;
    Ok(())
}

/// Write the commented template to `path`
pub fn init_config(path: &Path, force: bool) -> Result<(), ConfigError> {
    if path.exists() && !force {
        return Err(ConfigError::AlreadyExists(path.to_path_buf()));
    }
    let doc: toml_edit::DocumentMut = CONFIG_TEMPLATE.parse()?;
    write_document(path, &doc)
}

/// Config as TOML for display, with the token masked
pub fn render_config(config: &AppConfig) -> String {
    let mut shown = config.clone();
    shown.api.token = mask_token(&config.api.token);
    toml::to_string_pretty(&shown).unwrap_or_default()
}

/// Keep the first and last four characters of long tokens
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    match chars.len() {
        0 => String::new(),
        n if n <= 8 => "*".repeat(n),
        n => {
            let head: String = chars[..4].iter().collect();
            let tail: String = chars[n - 4..].iter().collect();
            format!("{head}…{tail}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample_config() -> &'static str {
        r#"# admin shop
[api]
base_url = "https://shop.example.com"
token = "abc123"   # expires monthly

[export]
bom = false
"#
    }

    #[test]
    fn missing_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = read_config_from(&tmp.path().join("nope.toml")).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:3001");
        assert_eq!(config.api.cookie_name, "token");
        assert_eq!(config.list.per_page, 20);
        assert!(config.export.bom);
        assert!(config.ui.show_key_hints);
    }

    #[test]
    fn template_parses_to_defaults() {
        let config: AppConfig = toml::from_str(CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:3001");
        assert_eq!(config.api.cookie_name, "token");
        assert_eq!(config.list.per_page, 20);
        assert!(config.export.bom);
        assert!(config.ui.colors.is_empty());
        assert!(CONFIG_TEMPLATE.contains("# highlight = \"#FB4196\""));
    }

    #[test]
    fn partial_file_fills_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, sample_config()).unwrap();
        let config = read_config_from(&path).unwrap();
        assert_eq!(config.api.base_url, "https://shop.example.com");
        assert_eq!(config.api.token, "abc123");
        assert_eq!(config.api.timeout_secs, 30);
        assert!(!config.export.bom);
        assert_eq!(config.export.delimiter, ',');
    }

    #[test]
    fn malformed_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[api\nbase_url = 1").unwrap();
        assert!(matches!(
            read_config_from(&path),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn flag_beats_env_and_env_token_applies() {
        let mut config = AppConfig::default();
        apply_overrides(
            &mut config,
            Some("http://flag:1".into()),
            Some("http://env:2".into()),
            Some("tok".into()),
        );
        assert_eq!(config.api.base_url, "http://flag:1");
        assert_eq!(config.api.token, "tok");

        let mut config = AppConfig::default();
        apply_overrides(&mut config, None, Some("http://env:2".into()), Some("  ".into()));
        assert_eq!(config.api.base_url, "http://env:2");
        assert_eq!(config.api.token, "");
    }

    #[test]
    fn set_preserves_comments_and_layout() {
        let mut doc: toml_edit::DocumentMut = sample_config().parse().unwrap();
        set_value(&mut doc, "api.token", "new-token").unwrap();
        let out = doc.to_string();
        assert!(out.starts_with("# admin shop\n"));
        assert!(out.contains("token = \"new-token\""));
        assert!(out.contains("bom = false"));
    }

    #[test]
    fn set_creates_missing_sections() {
        let mut doc = toml_edit::DocumentMut::new();
        set_value(&mut doc, "list.per_page", "50").unwrap();
        set_value(&mut doc, "export.delimiter", ";").unwrap();
        set_value(&mut doc, "ui.colors.highlight", "#FB4196").unwrap();
        let config: AppConfig = toml::from_str(&doc.to_string()).unwrap();
        assert_eq!(config.list.per_page, 50);
        assert_eq!(config.export.delimiter, ';');
        assert_eq!(config.ui.colors["highlight"], "#FB4196");
    }

    #[test]
    fn set_validates_values() {
        let mut doc = toml_edit::DocumentMut::new();
        assert!(matches!(
            set_value(&mut doc, "list.per_page", "0"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            set_value(&mut doc, "export.bom", "yes"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            set_value(&mut doc, "export.delimiter", ";;"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            set_value(&mut doc, "ui.colors.highlight", "pink"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            set_value(&mut doc, "api.password", "x"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn init_refuses_to_overwrite_without_force() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("config.toml");
        init_config(&path, false).unwrap();
        let config = read_config_from(&path).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:3001");

        assert!(matches!(
            init_config(&path, false),
            Err(ConfigError::AlreadyExists(_))
        ));
        init_config(&path, true).unwrap();
    }

    #[test]
    fn round_trip_write() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, sample_config()).unwrap();
        let doc = read_document(&path).unwrap();
        write_document(&path, &doc).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), sample_config());
    }

    #[test]
    fn token_masking() {
        assert_eq!(mask_token(""), "");
        assert_eq!(mask_token("short"), "*****");
        assert_eq!(mask_token("abcdefghijkl"), "abcd…ijkl");
        let mut config = AppConfig::default();
        config.api.token = "abcdefghijkl".into();
        let shown = render_config(&config);
        assert!(shown.contains("abcd…ijkl"));
        assert!(!shown.contains("abcdefghijkl"));
    }
}
