//! Router configuration
//!
//! Settings come from an optional TOML file (explicit path, or
//! `<config dir>/skill-router/config.toml`) and are then overridden by
//! environment variables:
//!
//! | Variable                    | Setting                  |
//! |-----------------------------|--------------------------|
//! | `WEATHER_API_KEY`           | `weather.api_key`        |
//! | `NEWS_API_KEY`              | `news.api_key`           |
//! | `LLM_BASE_URL`              | `model.base_url`         |
//! | `LLM_MODEL`                 | `model.model`            |
//! | `SKILL_ROUTER_DEFAULT_CITY` | `routing.default_city`   |

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Sample keys shipped in example `.env` files; treated as unset
const PLACEHOLDER_KEYS: &[&str] = &["your_weather_api_key", "your_news_api_key"];

// ============================================================================
// Configuration Structs
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub routing: RoutingSettings,
    pub weather: WeatherSettings,
    pub news: NewsSettings,
    pub encyclopedia: EncyclopediaSettings,
    pub model: ModelSettings,
    pub http: HttpSettings,
}

/// Defaults used by the intent matchers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingSettings {
    /// City used when a weather request names none
    pub default_city: String,

    /// Query sent to the news provider
    pub news_topic: String,
}

impl Default for RoutingSettings {
    fn default() -> Self {
        Self {
            default_city: "Москва".to_string(),
            news_topic: "новости".to_string(),
        }
    }
}

/// OpenWeatherMap settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub base_url: String,
    pub language: String,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "http://api.openweathermap.org".to_string(),
            language: "ru".to_string(),
        }
    }
}

impl WeatherSettings {
    /// API key, unless missing, blank or a sample placeholder
    pub fn configured_key(&self) -> Option<&str> {
        usable_key(self.api_key.as_deref())
    }
}

/// NewsAPI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub base_url: String,
    pub language: String,
    pub page_size: u32,
}

impl Default for NewsSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://newsapi.org".to_string(),
            language: "ru".to_string(),
            page_size: 5,
        }
    }
}

impl NewsSettings {
    pub fn configured_key(&self) -> Option<&str> {
        usable_key(self.api_key.as_deref())
    }
}

/// Wikipedia settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncyclopediaSettings {
    pub base_url: String,
    pub search_results: u32,
    pub sentences: usize,
}

impl Default for EncyclopediaSettings {
    fn default() -> Self {
        Self {
            base_url: "https://ru.wikipedia.org".to_string(),
            search_results: 3,
            sentences: 3,
        }
    }
}

/// Language model endpoint (OpenAI-compatible Responses API)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// e.g. `http://localhost:8000/v1`; when unset the offline responder is used
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub model: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            model: "yandex/YandexGPT-5-Lite-8B-instruct".to_string(),
            instructions: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Per-request timeout for every collaborator call
    pub timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self { timeout_secs: 10 }
    }
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn usable_key(key: Option<&str>) -> Option<&str> {
    key.map(str::trim)
        .filter(|k| !k.is_empty() && !PLACEHOLDER_KEYS.contains(k))
}

// ============================================================================
// Loading
// ============================================================================

impl Config {
    /// `<config dir>/skill-router/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("skill-router").join("config.toml"))
    }

    /// Load from `path` (or the default location if it exists), then apply
    /// environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(default) if default.exists() => Self::from_file(&default)?,
                _ => Self::default(),
            },
        };

        config.apply_overrides(|name| env::var(name).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid TOML configuration")
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// production)
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("WEATHER_API_KEY") {
            self.weather.api_key = Some(key);
        }
        if let Some(key) = lookup("NEWS_API_KEY") {
            self.news.api_key = Some(key);
        }
        if let Some(url) = lookup("LLM_BASE_URL") {
            self.model.base_url = Some(url);
        }
        if let Some(model) = lookup("LLM_MODEL") {
            self.model.model = model;
        }
        if let Some(city) = lookup("SKILL_ROUTER_DEFAULT_CITY") {
            self.routing.default_city = city;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.routing.default_city, "Москва");
        assert_eq!(config.routing.news_topic, "новости");
        assert_eq!(config.http.timeout(), Duration::from_secs(10));
        assert!(config.weather.configured_key().is_none());
        assert!(config.model.base_url.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [routing]
            default_city = "Казань"

            [news]
            api_key = "abc123"
            "#,
        )
        .unwrap();

        assert_eq!(config.routing.default_city, "Казань");
        assert_eq!(config.routing.news_topic, "новости");
        assert_eq!(config.news.configured_key(), Some("abc123"));
        assert_eq!(config.news.page_size, 5);
    }

    #[test]
    fn test_invalid_toml() {
        let result = Config::from_toml_str("[routing\ndefault_city = 1");
        assert!(result.is_err());
    }

    #[test]
    fn test_placeholder_keys_are_unset() {
        let mut config = Config::default();
        config.weather.api_key = Some("your_weather_api_key".to_string());
        config.news.api_key = Some("   ".to_string());
        assert!(config.weather.configured_key().is_none());
        assert!(config.news.configured_key().is_none());
    }

    #[test]
    fn test_overrides_win_over_file() {
        let mut config = Config::from_toml_str(
            r#"
            [weather]
            api_key = "from-file"
            "#,
        )
        .unwrap();

        let vars: HashMap<&str, &str> = [
            ("WEATHER_API_KEY", "from-env"),
            ("LLM_BASE_URL", "http://localhost:8000/v1"),
            ("SKILL_ROUTER_DEFAULT_CITY", "Самара"),
        ]
        .into_iter()
        .collect();
        config.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.weather.configured_key(), Some("from-env"));
        assert_eq!(config.model.base_url.as_deref(), Some("http://localhost:8000/v1"));
        assert_eq!(config.routing.default_city, "Самара");
        assert!(config.news.api_key.is_none());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[http]\ntimeout_secs = 3").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.http.timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_missing_file_is_error() {
        let result = Config::from_file(Path::new("/nonexistent/skill-router.toml"));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Failed to read config"));
    }
}
