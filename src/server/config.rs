use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::alarm::controller::DEFAULT_PAGE_SIZE;

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ConsoleConfig {
    /// Base URL of the monitoring backend, e.g. `http://backend:8000`.
    pub api_base_url: String,

    #[serde(default)]
    pub api_token: Option<String>,

    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_locale")]
    pub default_locale: String,

    #[serde(default = "default_page_size")]
    pub page_size: u32,

    #[serde(default)]
    pub display_utc_offset_minutes: i32,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
struct PartialConsoleConfig {
    api_base_url: Option<String>,
    api_token: Option<String>,
    listen_addr: Option<String>,
    log_dir: Option<String>,
    default_locale: Option<String>,
    page_size: Option<u32>,
    display_utc_offset_minutes: Option<i32>,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8090".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn read_file_layer(config_path: Option<&str>) -> Result<PartialConsoleConfig, String> {
    let Some(path_str) = config_path else {
        return Ok(PartialConsoleConfig::default());
    };
    let path = Path::new(path_str);
    if !path.exists() {
        return Ok(PartialConsoleConfig::default());
    }
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file at {path:?}: {e}"))?;
    toml::from_str(&contents)
        .map_err(|e| format!("Failed to parse TOML from config file at {path:?}: {e}"))
}

fn merge(env_config: PartialConsoleConfig, file_config: PartialConsoleConfig) -> Result<ConsoleConfig, String> {
    let page_size = env_config
        .page_size
        .or(file_config.page_size)
        .unwrap_or_else(default_page_size);
    if page_size == 0 {
        return Err("PAGE_SIZE must be greater than zero".to_string());
    }

    Ok(ConsoleConfig {
        api_base_url: env_config.api_base_url.or(file_config.api_base_url)
            .ok_or("API_BASE_URL is required")?,
        api_token: env_config.api_token.or(file_config.api_token)
            .filter(|token| !token.is_empty()),
        listen_addr: env_config.listen_addr.or(file_config.listen_addr)
            .unwrap_or_else(default_listen_addr),
        log_dir: env_config.log_dir.or(file_config.log_dir)
            .unwrap_or_else(default_log_dir),
        default_locale: env_config.default_locale.or(file_config.default_locale)
            .unwrap_or_else(default_locale),
        page_size,
        display_utc_offset_minutes: env_config.display_utc_offset_minutes
            .or(file_config.display_utc_offset_minutes)
            .unwrap_or(0),
    })
}

impl ConsoleConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self, String> {
        dotenv::dotenv().ok();

        // 1. Load from file (optional)
        let file_config = read_file_layer(config_path)?;

        // 2. Load from environment variables
        let env_config: PartialConsoleConfig = envy::from_env::<PartialConsoleConfig>()
            .map_err(|e| format!("Failed to load config from environment: {e}"))?;

        // 3. Merge: environment overrides file
        merge(env_config, file_config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_file_layer_with_defaults() {
        let file = write_config(
            r#"
api_base_url = "http://backend:8000"
page_size = 50
"#,
        );
        let file_config = read_file_layer(file.path().to_str()).unwrap();
        let config = merge(PartialConsoleConfig::default(), file_config).unwrap();

        assert_eq!(config.api_base_url, "http://backend:8000");
        assert_eq!(config.page_size, 50);
        assert_eq!(config.listen_addr, "0.0.0.0:8090");
        assert_eq!(config.log_dir, "logs");
        assert_eq!(config.default_locale, "en");
        assert_eq!(config.api_token, None);
        assert_eq!(config.display_utc_offset_minutes, 0);
    }

    #[test]
    fn test_env_overrides_file() {
        let file_config = PartialConsoleConfig {
            api_base_url: Some("http://file".to_string()),
            default_locale: Some("en".to_string()),
            ..Default::default()
        };
        let env_config = PartialConsoleConfig {
            api_base_url: Some("http://env".to_string()),
            default_locale: Some("zh-CN".to_string()),
            display_utc_offset_minutes: Some(480),
            ..Default::default()
        };

        let config = merge(env_config, file_config).unwrap();
        assert_eq!(config.api_base_url, "http://env");
        assert_eq!(config.default_locale, "zh-CN");
        assert_eq!(config.display_utc_offset_minutes, 480);
    }

    #[test]
    fn test_missing_base_url_is_an_error() {
        let err = merge(PartialConsoleConfig::default(), PartialConsoleConfig::default()).unwrap_err();
        assert!(err.contains("API_BASE_URL"));
    }

    #[test]
    fn test_zero_page_size_is_rejected() {
        let env_config = PartialConsoleConfig {
            api_base_url: Some("http://env".to_string()),
            page_size: Some(0),
            ..Default::default()
        };
        assert!(merge(env_config, PartialConsoleConfig::default()).is_err());
    }

    #[test]
    fn test_missing_or_broken_file() {
        assert!(read_file_layer(Some("/nonexistent/console.toml")).unwrap().api_base_url.is_none());

        let file = write_config("api_base_url = ");
        assert!(read_file_layer(file.path().to_str()).unwrap_err().contains("Failed to parse TOML"));
    }
}
