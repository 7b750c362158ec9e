use async_trait::async_trait;
use chrono::{Duration, Utc};
use futures_util::future::join_all;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashSet;

use signal_core::{Article, NewsProvider, SignalError, TtlCache};

pub mod rss;

pub use rss::clean_html;

/// Free RSS feeds, used as the fallback news source
pub const RSS_FEEDS: [(&str, &str); 5] = [
    (
        "reuters",
        "https://www.reutersagency.com/feed/?taxonomy=best-topics&post_type=best",
    ),
    ("marketwatch", "https://www.marketwatch.com/rss/topstories"),
    (
        "cnbc",
        "https://search.cnbc.com/rs/search/combinedcms/view.xml?partnerId=wrss01&id=10000664",
    ),
    ("yahoo", "https://finance.yahoo.com/news/rssindex"),
    ("seeking_alpha", "https://seekingalpha.com/feed.xml"),
];

const NEWSAPI_BASE_URL: &str = "https://newsapi.org/v2";
const PER_FEED_CAP: usize = 20;
const NEWS_CACHE_TTL_SECS: i64 = 7200; // 2 hours

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
struct NewsApiArticle {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<chrono::DateTime<Utc>>,
    source: Option<NewsApiSource>,
}

#[derive(Debug, Deserialize)]
struct NewsApiSource {
    name: Option<String>,
}

/// Aggregates headlines from NewsAPI (primary) and RSS feeds (fallback)
pub struct NewsAggregator {
    http: Client,
    newsapi_key: Option<String>,
    lookback_hours: i64,
    cache: TtlCache<Vec<Article>>,
}

impl NewsAggregator {
    pub fn new(newsapi_key: Option<String>, lookback_hours: i64) -> Self {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            http,
            newsapi_key: newsapi_key.filter(|k| !k.is_empty()),
            lookback_hours,
            cache: TtlCache::new(NEWS_CACHE_TTL_SECS),
        }
    }

    pub fn from_env() -> Self {
        Self::new(std::env::var("NEWSAPI_KEY").ok(), 24)
    }

    async fn fetch_feed(&self, source: &str, url: &str) -> Vec<Article> {
        let cutoff = Utc::now() - Duration::hours(self.lookback_hours);

        let body = match self.http.get(url).send().await {
            Ok(resp) if resp.status().is_success() => match resp.text().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!("Error reading RSS body from {}: {}", source, e);
                    return Vec::new();
                }
            },
            Ok(resp) => {
                tracing::warn!("RSS feed {} returned HTTP {}", source, resp.status());
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!("Error fetching RSS feed {}: {}", source, e);
                return Vec::new();
            }
        };

        let articles = rss::parse_feed(&body, source, cutoff, PER_FEED_CAP);
        tracing::debug!("Fetched {} articles from {}", articles.len(), source);
        articles
    }

    /// Fetch all RSS feeds, deduplicate, and return newest first.
    pub async fn fetch_all_feeds(&self, max_articles: usize) -> Vec<Article> {
        let fetches = RSS_FEEDS
            .iter()
            .map(|(source, url)| self.fetch_feed(source, url));
        let mut articles: Vec<Article> = join_all(fetches).await.into_iter().flatten().collect();

        articles = dedup_by_title(articles);
        articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        articles.truncate(max_articles);

        tracing::info!("Aggregated {} articles from RSS feeds", articles.len());
        articles
    }

    async fn fetch_newsapi(
        &self,
        query: &str,
        max_articles: usize,
    ) -> Result<Vec<Article>, SignalError> {
        let key = self
            .newsapi_key
            .as_deref()
            .ok_or_else(|| SignalError::ApiError("NewsAPI key not configured".to_string()))?;

        let from = (Utc::now() - Duration::hours(self.lookback_hours)).to_rfc3339();
        let response = self
            .http
            .get(format!("{}/everything", NEWSAPI_BASE_URL))
            .query(&[
                ("q", query),
                ("from", &from),
                ("sortBy", "publishedAt"),
                ("language", "en"),
                ("pageSize", &max_articles.to_string()),
                ("apiKey", key),
            ])
            .send()
            .await
            .map_err(|e| SignalError::ApiError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SignalError::ApiError(format!(
                "NewsAPI HTTP {}",
                response.status()
            )));
        }

        let parsed: NewsApiResponse = response
            .json()
            .await
            .map_err(|e| SignalError::ApiError(e.to_string()))?;

        let articles = parsed
            .articles
            .into_iter()
            .filter_map(|a| {
                let title = a.title?.trim().to_string();
                let summary = clean_html(a.description.unwrap_or_default().trim());
                if title.is_empty() || summary.is_empty() {
                    return None;
                }
                Some(Article {
                    title,
                    summary,
                    url: a.url.unwrap_or_default(),
                    source: a
                        .source
                        .and_then(|s| s.name)
                        .unwrap_or_else(|| "newsapi".to_string()),
                    published_at: a.published_at.unwrap_or_else(Utc::now),
                    sentiment: None,
                })
            })
            .collect();

        Ok(articles)
    }
}

#[async_trait]
impl NewsProvider for NewsAggregator {
    async fn latest_articles(&self, max_articles: usize) -> Result<Vec<Article>, SignalError> {
        let cache_key = format!("market:{}", max_articles);
        if let Some(cached) = self.cache.get(&cache_key) {
            return Ok(cached);
        }

        let articles = self.fetch_all_feeds(max_articles).await;
        if !articles.is_empty() {
            self.cache.insert(cache_key, articles.clone());
        }
        Ok(articles)
    }

    async fn articles_for_symbol(
        &self,
        symbol: &str,
        max_articles: usize,
    ) -> Result<Vec<Article>, SignalError> {
        if self.newsapi_key.is_some() {
            match self.fetch_newsapi(symbol, max_articles).await {
                Ok(articles) if !articles.is_empty() => {
                    tracing::info!("Got {} articles for {} from NewsAPI", articles.len(), symbol);
                    return Ok(articles);
                }
                Ok(_) => {
                    tracing::debug!("NewsAPI returned nothing for {}, trying RSS", symbol);
                }
                Err(e) => {
                    tracing::warn!("NewsAPI failed for {}: {}. Falling back to RSS", symbol, e);
                }
            }
        }

        // RSS fallback: over-fetch and keep only articles mentioning the symbol
        let all = self.fetch_all_feeds(max_articles * 3).await;
        let mut matched: Vec<Article> = all
            .into_iter()
            .filter(|a| mentions_symbol(&a.full_text(), symbol))
            .collect();
        matched.truncate(max_articles);
        Ok(matched)
    }
}

/// Case-sensitive whole-token match, so "AMD" matches but "amid" does not
pub fn mentions_symbol(text: &str, symbol: &str) -> bool {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .any(|token| token == symbol)
}

/// Drop articles whose normalized titles collide, keeping first occurrence.
///
/// Normalization lowercases and strips punctuation so syndicated copies of
/// the same story land on the same key.
pub fn dedup_by_title(articles: Vec<Article>) -> Vec<Article> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut unique = Vec::with_capacity(articles.len());

    for article in articles {
        let key: String = article
            .title
            .to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric() || c.is_whitespace())
            .collect();
        if seen.insert(key) {
            unique.push(article);
        }
    }

    unique
}
