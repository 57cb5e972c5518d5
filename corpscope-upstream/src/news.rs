//! News RSS fetcher.
//!
//! Queries the Google News search feed for a keyword with fixed Korean
//! locale parameters and maps the leading items into compact entries for
//! the front-end. Any failure degrades to an empty list so the caller's
//! request keeps working.

use std::sync::Mutex;

use async_trait::async_trait;
use rss::Channel;
use serde::Serialize;
use tracing::{error, info};

use corpscope_core::config::NewsConfig;

use crate::errors::UpstreamError;
use crate::transport::HttpTransport;

/// Marker appended to every item description.
const ELLIPSIS: &str = "...";
/// Number of description characters kept before the marker.
const DESCRIPTION_CHARS: usize = 100;

/// One news entry as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewsItem {
    /// Item headline
    pub title: String,
    /// Markup-stripped, truncated summary
    pub description: String,
    /// Link to the article
    pub link: String,
    /// Publication date string as given by the feed
    #[serde(rename = "pubDate")]
    pub pub_date: String,
}

/// Trait for news backends.
///
/// Fetching is best-effort by contract: implementations log failures and
/// return an empty list instead of erroring.
#[async_trait]
pub trait NewsProvider: Send + Sync + std::fmt::Debug {
    /// Fetches the top feed items for a keyword.
    async fn fetch(&self, keyword: &str) -> Vec<NewsItem>;
}

/// Fetches and parses the keyword news feed.
#[derive(Debug, Clone)]
pub struct NewsFetcher {
    transport: HttpTransport,
    config: NewsConfig,
}

#[async_trait]
impl NewsProvider for NewsFetcher {
    async fn fetch(&self, keyword: &str) -> Vec<NewsItem> {
        match self.try_fetch(keyword).await {
            Ok(items) => {
                info!("news fetch for {keyword:?}: {} items", items.len());
                items
            }
            Err(e) => {
                error!("news fetch for {keyword:?} failed: {e}");
                Vec::new()
            }
        }
    }
}

impl NewsFetcher {
    /// Creates a fetcher over the shared transport.
    pub fn new(config: NewsConfig, transport: HttpTransport) -> Self {
        Self { transport, config }
    }

    async fn try_fetch(&self, keyword: &str) -> Result<Vec<NewsItem>, UpstreamError> {
        let url = format!(
            "{}?q={}&hl={}&gl={}&ceid={}",
            self.config.base_url,
            urlencoding::encode(keyword),
            self.config.language,
            self.config.region,
            self.config.edition,
        );

        let response = self
            .transport
            .get(&url, &[] as &[(&str, &str)], self.config.timeout)
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::UpstreamStatus {
                status: status.as_u16(),
                body: String::new(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::RequestFailed {
                reason: e.to_string(),
            })?;

        let channel =
            Channel::read_from(&body[..]).map_err(|e| UpstreamError::MalformedPayload {
                reason: e.to_string(),
            })?;

        Ok(items_from_channel(&channel, self.config.max_items))
    }
}

/// Scripted backend for tests and offline development.
///
/// Answers every fetch with the same canned item list.
#[derive(Debug, Default)]
pub struct ScriptedNews {
    items: Mutex<Vec<NewsItem>>,
}

impl ScriptedNews {
    /// Creates a backend that always answers with an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend answering with the given items.
    pub fn with_items(items: Vec<NewsItem>) -> Self {
        Self {
            items: Mutex::new(items),
        }
    }

    /// Replaces the canned items.
    pub fn set_items(&self, items: Vec<NewsItem>) {
        *self.items.lock().unwrap() = items;
    }
}

#[async_trait]
impl NewsProvider for ScriptedNews {
    async fn fetch(&self, _keyword: &str) -> Vec<NewsItem> {
        self.items.lock().unwrap().clone()
    }
}

/// Maps the first `max_items` feed items into [`NewsItem`]s.
fn items_from_channel(channel: &Channel, max_items: usize) -> Vec<NewsItem> {
    channel
        .items()
        .iter()
        .take(max_items)
        .map(|item| NewsItem {
            title: item.title().unwrap_or("제목 없음").to_string(),
            description: truncate_description(&strip_markup(item.description().unwrap_or_default())),
            link: item.link().unwrap_or("#").to_string(),
            pub_date: item.pub_date().unwrap_or_default().to_string(),
        })
        .collect()
}

/// Removes tags and decodes the common entities from feed markup.
fn strip_markup(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }

    out.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Keeps the first 100 characters and appends the ellipsis marker.
///
/// The marker is appended unconditionally, also when the text is already
/// shorter than the cap; clients rely on the trailing marker.
fn truncate_description(text: &str) -> String {
    let head: String = text.chars().take(DESCRIPTION_CHARS).collect();
    format!("{head}{ELLIPSIS}")
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
<channel>
  <title>검색 결과</title>
  <link>https://news.example.com</link>
  <description>feed</description>
  <item>
    <title>삼성전자, 신규 반도체 공장 착공</title>
    <link>https://news.example.com/a</link>
    <pubDate>Mon, 03 Aug 2026 09:00:00 GMT</pubDate>
    <description>&lt;a href="https://news.example.com/a"&gt;삼성전자&lt;/a&gt;가 새 공장을 짓는다</description>
  </item>
  <item>
    <title>두번째 기사</title>
    <link>https://news.example.com/b</link>
  </item>
  <item><title>3</title><link>#</link></item>
  <item><title>4</title><link>#</link></item>
  <item><title>5</title><link>#</link></item>
  <item><title>6 should be dropped</title><link>#</link></item>
</channel>
</rss>"#;

    #[test]
    fn test_only_leading_items_are_kept() {
        let channel = Channel::read_from(FEED.as_bytes()).unwrap();
        let items = items_from_channel(&channel, 5);

        assert_eq!(items.len(), 5);
        assert_eq!(items[0].title, "삼성전자, 신규 반도체 공장 착공");
        assert!(!items.iter().any(|i| i.title.contains("dropped")));
    }

    #[test]
    fn test_markup_is_stripped_from_description() {
        let channel = Channel::read_from(FEED.as_bytes()).unwrap();
        let items = items_from_channel(&channel, 5);

        assert_eq!(items[0].description, "삼성전자가 새 공장을 짓는다...");
        assert_eq!(items[0].link, "https://news.example.com/a");
        assert_eq!(items[0].pub_date, "Mon, 03 Aug 2026 09:00:00 GMT");
    }

    #[test]
    fn test_missing_fields_get_placeholders() {
        let channel = Channel::read_from(FEED.as_bytes()).unwrap();
        let items = items_from_channel(&channel, 5);

        assert_eq!(items[1].pub_date, "");
        assert_eq!(items[1].description, "...");
    }

    #[test]
    fn test_truncation_bound_and_marker() {
        let nearly_full = "x".repeat(99);
        let exactly_full = "x".repeat(100);
        let oversized = "가".repeat(500);
        for text in [
            "",
            "short",
            "정확히 백 글자가 아닌 어떤 한국어 설명",
            nearly_full.as_str(),
            exactly_full.as_str(),
            oversized.as_str(),
        ] {
            let truncated = truncate_description(text);
            assert!(truncated.chars().count() <= DESCRIPTION_CHARS + ELLIPSIS.len());
            assert!(truncated.ends_with(ELLIPSIS));
        }
    }

    #[test]
    fn test_truncation_counts_characters_not_bytes() {
        let long = "한".repeat(200);
        let truncated = truncate_description(&long);

        assert_eq!(truncated.chars().count(), 103);
        assert!(truncated.starts_with(&"한".repeat(100)));
    }

    #[test]
    fn test_strip_markup_entities() {
        assert_eq!(
            strip_markup("<b>A &amp; B</b>&nbsp;<i>C</i>"),
            "A & B C"
        );
        assert_eq!(strip_markup("plain text"), "plain text");
    }

    #[tokio::test]
    async fn test_scripted_backend_replays_items() {
        let news = ScriptedNews::with_items(vec![NewsItem {
            title: "기사".to_string(),
            description: "요약...".to_string(),
            link: "#".to_string(),
            pub_date: String::new(),
        }]);

        assert_eq!(news.fetch("아무거나").await.len(), 1);
        news.set_items(Vec::new());
        assert!(news.fetch("아무거나").await.is_empty());
    }
}
