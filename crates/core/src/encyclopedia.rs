//! Wikipedia lookups
//!
//! Two requests per query: a MediaWiki full-text search to find the best
//! matching title, then the REST summary of that page.

use anyhow::{anyhow, bail, Context, Result};
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::collaborators::EncyclopediaService;
use crate::config::EncyclopediaSettings;
use crate::types::EncyclopediaEntry;

pub struct WikipediaClient {
    client: Client,
    base_url: String,
    search_results: u32,
    sentences: usize,
}

impl WikipediaClient {
    pub fn new(client: Client, settings: &EncyclopediaSettings) -> Self {
        Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            search_results: settings.search_results,
            sentences: settings.sentences,
        }
    }

    fn search(&self, query: &str) -> Result<Vec<String>> {
        let url = format!("{}/w/api.php", self.base_url);
        let limit = self.search_results.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", limit.as_str()),
                ("format", "json"),
            ])
            .send()
            .context("Wikipedia search failed")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("Wikipedia search error {}", status));
        }

        let data: SearchResponse = response
            .json()
            .context("Failed to parse Wikipedia search response")?;

        Ok(data.query.search.into_iter().map(|hit| hit.title).collect())
    }

    fn page_summary(&self, title: &str) -> Result<PageSummary> {
        let url = format!(
            "{}/api/rest_v1/page/summary/{}",
            self.base_url,
            urlencoding::encode(&title.replace(' ', "_"))
        );

        let response = self
            .client
            .get(&url)
            .send()
            .context("Wikipedia summary request failed")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("Wikipedia summary error {} for '{}'", status, title));
        }

        response
            .json()
            .context("Failed to parse Wikipedia summary response")
    }
}

#[derive(Deserialize, Debug)]
struct SearchResponse {
    query: SearchQuery,
}

#[derive(Deserialize, Debug)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Deserialize, Debug)]
struct SearchHit {
    title: String,
}

#[derive(Deserialize, Debug)]
struct PageSummary {
    title: String,
    #[serde(default)]
    extract: String,
    content_urls: Option<ContentUrls>,
}

#[derive(Deserialize, Debug)]
struct ContentUrls {
    desktop: PageUrl,
}

#[derive(Deserialize, Debug)]
struct PageUrl {
    page: String,
}

impl EncyclopediaService for WikipediaClient {
    fn fetch_summary(&self, query: &str) -> Result<EncyclopediaEntry> {
        let query = query.trim();
        if query.is_empty() {
            bail!("Empty encyclopedia query");
        }

        let titles = self.search(query)?;
        let title = titles
            .first()
            .ok_or_else(|| anyhow!("No Wikipedia articles found for '{}'", query))?;

        let summary = self.page_summary(title)?;
        let url = match summary.content_urls {
            Some(urls) => urls.desktop.page,
            None => format!(
                "{}/wiki/{}",
                self.base_url,
                urlencoding::encode(&summary.title.replace(' ', "_"))
            ),
        };

        Ok(EncyclopediaEntry {
            summary: first_sentences(&summary.extract, self.sentences),
            title: summary.title,
            url,
        })
    }
}

/// Lookup that always fails, for runs without network access
pub struct OfflineEncyclopedia;

impl EncyclopediaService for OfflineEncyclopedia {
    fn fetch_summary(&self, _query: &str) -> Result<EncyclopediaEntry> {
        bail!("Encyclopedia lookups are unavailable offline")
    }
}

/// Keep the first `count` sentences of `text`
fn first_sentences(text: &str, count: usize) -> String {
    let mut seen = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            let at_boundary = chars.peek().map_or(true, |(_, next)| next.is_whitespace());
            if at_boundary {
                seen += 1;
                if seen == count {
                    return text[..idx + c.len_utf8()].to_string();
                }
            }
        }
    }

    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client_for(url: String) -> WikipediaClient {
        let settings = EncyclopediaSettings {
            base_url: url,
            ..Default::default()
        };
        WikipediaClient::new(Client::new(), &settings)
    }

    #[test]
    fn test_first_sentences() {
        let text = "Один. Два! Три? Четыре.";
        assert_eq!(first_sentences(text, 3), "Один. Два! Три?");
        assert_eq!(first_sentences(text, 10), text);
        assert_eq!(first_sentences("Версия 1.5 вышла. Потом 2.0.", 1), "Версия 1.5 вышла.");
    }

    #[test]
    fn test_fetch_summary() {
        let mut server = mockito::Server::new();
        let search = server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("list".into(), "search".into()),
                Matcher::UrlEncoded("srsearch".into(), "Rust".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"query":{"search":[{"title":"Rust (язык программирования)"},{"title":"Ржавчина"}]}}"#)
            .create();
        let summary = server
            .mock(
                "GET",
                Matcher::Regex(r"^/api/rest_v1/page/summary/Rust_%28".to_string()),
            )
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "title": "Rust (язык программирования)",
                    "extract": "Rust — язык программирования. Он компилируемый. Он быстрый. Он безопасный.",
                    "content_urls": {"desktop": {"page": "https://ru.wikipedia.org/wiki/Rust"}}
                }"#,
            )
            .create();

        let entry = client_for(server.url()).fetch_summary("Rust").unwrap();

        search.assert();
        summary.assert();
        assert_eq!(entry.title, "Rust (язык программирования)");
        assert_eq!(entry.summary, "Rust — язык программирования. Он компилируемый. Он быстрый.");
        assert_eq!(entry.url, "https://ru.wikipedia.org/wiki/Rust");
    }

    #[test]
    fn test_no_search_results() {
        let mut server = mockito::Server::new();
        let _search = server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"query":{"search":[]}}"#)
            .create();

        let err = client_for(server.url()).fetch_summary("ыыыы").unwrap_err();
        assert!(err.to_string().contains("No Wikipedia articles"));
    }

    #[test]
    fn test_empty_query_fails_without_request() {
        let client = client_for("http://127.0.0.1:9".to_string());
        let err = client.fetch_summary("   ").unwrap_err();
        assert!(err.to_string().contains("Empty"));
    }
}
