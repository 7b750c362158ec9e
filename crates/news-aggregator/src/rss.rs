use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use quick_xml::de::from_str;
use regex::Regex;
use serde::Deserialize;

use signal_core::Article;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

/// Strip HTML tags and collapse whitespace
pub fn clean_html(text: &str) -> String {
    let stripped = HTML_TAG.replace_all(text, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn parse_pub_date(raw: Option<&str>) -> DateTime<Utc> {
    raw.and_then(|s| DateTime::parse_from_rfc2822(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now)
}

/// Parse an RSS document into articles from `source`, keeping at most
/// `per_feed_cap` entries published at or after `cutoff`.
pub fn parse_feed(
    xml: &str,
    source: &str,
    cutoff: DateTime<Utc>,
    per_feed_cap: usize,
) -> Vec<Article> {
    let rss: Rss = match from_str(xml) {
        Ok(rss) => rss,
        Err(e) => {
            tracing::debug!("Skipping malformed RSS from {}: {}", source, e);
            return Vec::new();
        }
    };

    let mut articles = Vec::new();
    for item in rss.channel.items.into_iter().take(per_feed_cap) {
        let title = item.title.as_deref().unwrap_or("").trim().to_string();
        let summary = clean_html(item.description.as_deref().unwrap_or("").trim());
        if title.is_empty() || summary.is_empty() {
            continue;
        }

        let published_at = parse_pub_date(item.pub_date.as_deref());
        if published_at < cutoff {
            continue;
        }

        articles.push(Article {
            title,
            summary,
            url: item.link.unwrap_or_default(),
            source: source.to_string(),
            published_at,
            sentiment: None,
        });
    }

    articles
}
