//! External collaborator capabilities
//!
//! The dispatcher only sees these traits. Production implementations talk
//! HTTP (see `weather`, `news`, `encyclopedia` and `llm`); tests inject
//! stubs. Every implementation must be safe to call from several threads
//! at once.

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use tracing::info;

use crate::config::{Config, HttpSettings};
use crate::encyclopedia::{OfflineEncyclopedia, WikipediaClient};
use crate::news::{DemoNews, NewsApiClient};
use crate::types::{ChatTurn, EncyclopediaEntry, NewsArticle, WeatherInfo};
use crate::weather::{DemoWeather, OpenWeatherClient};

/// Current weather for a city
pub trait WeatherService: Send + Sync {
    fn fetch_weather(&self, city: &str) -> Result<WeatherInfo>;
}

/// Latest headlines for a topic; an empty list counts as a failure
pub trait NewsService: Send + Sync {
    fn fetch_news(&self, topic: &str) -> Result<Vec<NewsArticle>>;
}

/// Short article summary for a free-text query
pub trait EncyclopediaService: Send + Sync {
    fn fetch_summary(&self, query: &str) -> Result<EncyclopediaEntry>;
}

/// Generative language model, invoked by the caller of the dispatcher
pub trait ModelClient: Send + Sync {
    fn generate(&self, turns: &[ChatTurn]) -> Result<String>;

    /// Whether the model can answer right now
    fn is_ready(&self) -> bool {
        true
    }
}

/// The lookups the dispatcher delegates to
pub struct Collaborators {
    pub weather: Box<dyn WeatherService>,
    pub news: Box<dyn NewsService>,
    pub encyclopedia: Box<dyn EncyclopediaService>,
}

impl Collaborators {
    /// HTTP collaborators; weather and news fall back to demo data when no
    /// API key is configured
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = http_client(&config.http)?;

        let weather: Box<dyn WeatherService> = match config.weather.configured_key() {
            Some(key) => Box::new(OpenWeatherClient::new(client.clone(), &config.weather, key)),
            None => {
                info!("No weather API key configured, using demo weather data");
                Box::new(DemoWeather)
            }
        };

        let news: Box<dyn NewsService> = match config.news.configured_key() {
            Some(key) => Box::new(NewsApiClient::new(client.clone(), &config.news, key)),
            None => {
                info!("No news API key configured, using demo headlines");
                Box::new(DemoNews)
            }
        };

        let encyclopedia = Box::new(WikipediaClient::new(client, &config.encyclopedia));

        Ok(Self {
            weather,
            news,
            encyclopedia,
        })
    }

    /// No network access at all
    pub fn offline() -> Self {
        Self {
            weather: Box::new(DemoWeather),
            news: Box::new(DemoNews),
            encyclopedia: Box::new(OfflineEncyclopedia),
        }
    }
}

/// Shared blocking HTTP client with the configured per-request timeout
pub fn http_client(settings: &HttpSettings) -> Result<Client> {
    Client::builder()
        .timeout(settings.timeout())
        .build()
        .context("Failed to create HTTP client")
}
