//! NewsAPI client (`/v2/everything`, newest first)

use anyhow::{anyhow, Context, Result};
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::collaborators::NewsService;
use crate::config::NewsSettings;
use crate::types::NewsArticle;

pub struct NewsApiClient {
    client: Client,
    base_url: String,
    api_key: String,
    language: String,
    page_size: u32,
}

impl NewsApiClient {
    pub fn new(client: Client, settings: &NewsSettings, api_key: &str) -> Self {
        Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            language: settings.language.clone(),
            page_size: settings.page_size,
        }
    }
}

#[derive(Deserialize, Debug)]
struct EverythingResponse {
    #[serde(default)]
    articles: Vec<RawArticle>,
}

/// Provider articles may omit any field
#[derive(Deserialize, Debug)]
struct RawArticle {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
}

impl RawArticle {
    fn into_article(self) -> Option<NewsArticle> {
        Some(NewsArticle {
            title: self.title?,
            description: self.description,
            url: self.url?,
            published_at: self.published_at.unwrap_or_default(),
        })
    }
}

impl NewsService for NewsApiClient {
    fn fetch_news(&self, topic: &str) -> Result<Vec<NewsArticle>> {
        let url = format!("{}/v2/everything", self.base_url);
        let page_size = self.page_size.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", topic),
                ("apiKey", self.api_key.as_str()),
                ("language", self.language.as_str()),
                ("sortBy", "publishedAt"),
                ("pageSize", page_size.as_str()),
            ])
            .send()
            .context("News request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(anyhow!("News API error {}: {}", status, body));
        }

        let data: EverythingResponse = response.json().context("Failed to parse news response")?;

        Ok(data
            .articles
            .into_iter()
            .filter_map(RawArticle::into_article)
            .collect())
    }
}

/// Three canned headlines used when no API key is configured
pub struct DemoNews;

impl NewsService for DemoNews {
    fn fetch_news(&self, _topic: &str) -> Result<Vec<NewsArticle>> {
        let sample = [
            (
                "Демо новость 1: Важные события в мире технологий",
                "Последние достижения в области искусственного интеллекта и машинного обучения.",
                "https://example.com/news1",
                "2025-07-31T10:00:00Z",
            ),
            (
                "Демо новость 2: Развитие экологически чистых технологий",
                "Новые решения для защиты окружающей среды и устойчивого развития.",
                "https://example.com/news2",
                "2025-07-31T09:30:00Z",
            ),
            (
                "Демо новость 3: Инновации в медицине",
                "Передовые методы лечения и диагностики заболеваний.",
                "https://example.com/news3",
                "2025-07-31T09:00:00Z",
            ),
        ];

        Ok(sample
            .iter()
            .map(|(title, description, url, published_at)| NewsArticle {
                title: title.to_string(),
                description: Some(description.to_string()),
                url: url.to_string(),
                published_at: published_at.to_string(),
            })
            .collect())
    }
}
