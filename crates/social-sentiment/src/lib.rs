use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

use signal_core::SignalError;

const APEWISDOM_BASE_URL: &str = "https://apewisdom.io/api/v1.0";
const TRADESTIE_BASE_URL: &str = "https://tradestie.com/api/v1/apps/reddit";

/// Momentum % at which the hype contribution saturates
const MOMENTUM_CAP: f64 = 200.0;

/// Known crypto tickers filtered out of stock trending lists
const CRYPTO_TICKERS: &[&str] = &[
    "BTC", "ETH", "DOGE", "ADA", "SOL", "XRP", "DOT", "MATIC", "LINK", "UNI", "AVAX", "ATOM",
    "LTC", "BCH", "XLM", "ALGO", "VET", "FIL", "AAVE", "COMP", "SNX", "MKR", "SUSHI", "CRV",
    "YFI", "BAL", "REN", "BNB", "SHIB", "LUNA", "FTT", "CRO", "NEAR", "APE", "GALA", "SAND",
    "MANA", "AXS", "ENJ", "CHZ", "BAT", "ZRX", "OMG", "KNC", "GRT",
];

/// Hype categorization from momentum and raw mention count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HypeLevel {
    Extreme,
    High,
    Moderate,
    Stable,
}

impl HypeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            HypeLevel::Extreme => "EXTREME",
            HypeLevel::High => "HIGH",
            HypeLevel::Moderate => "MODERATE",
            HypeLevel::Stable => "STABLE",
        }
    }
}

/// Social media mention data for one stock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialMention {
    pub symbol: String,
    pub mentions: i64,
    pub mentions_24h_ago: i64,
    pub sentiment_score: f64,
    pub rank: u32,
    pub source: String,
}

impl SocialMention {
    /// Percent change in mentions vs 24 hours ago. A symbol appearing from
    /// nowhere reads as 100%, no data at all as 0%.
    pub fn momentum(&self) -> f64 {
        if self.mentions_24h_ago > 0 {
            ((self.mentions - self.mentions_24h_ago) as f64 / self.mentions_24h_ago as f64) * 100.0
        } else if self.mentions > 0 {
            100.0
        } else {
            0.0
        }
    }

    pub fn hype_level(&self) -> HypeLevel {
        let momentum = self.momentum();
        if momentum > 100.0 && self.mentions > 500 {
            HypeLevel::Extreme
        } else if momentum > 50.0 && self.mentions > 200 {
            HypeLevel::High
        } else if momentum > 20.0 {
            HypeLevel::Moderate
        } else {
            HypeLevel::Stable
        }
    }
}

/// Combined hype score in [0, 1]: social momentum 30%, social sentiment
/// 20%, news sentiment 50%. Without social data only news remains.
pub fn hype_score(social: Option<&SocialMention>, news_sentiment: f64) -> f64 {
    let news_component = (news_sentiment + 1.0) / 2.0;

    let Some(mention) = social else {
        return news_component;
    };

    // Collapsing mentions would otherwise push the score below zero
    let momentum_component = (mention.momentum() / MOMENTUM_CAP).clamp(0.0, 1.0);
    let social_component = (mention.sentiment_score + 1.0) / 2.0;

    momentum_component * 0.30 + social_component * 0.20 + news_component * 0.50
}

pub fn is_trending(social: Option<&SocialMention>, min_mentions: i64, min_momentum: f64) -> bool {
    match social {
        Some(mention) => mention.mentions >= min_mentions && mention.momentum() >= min_momentum,
        None => false,
    }
}

#[derive(Debug, Deserialize)]
struct ApeWisdomResponse {
    #[serde(default)]
    results: Vec<ApeWisdomItem>,
}

#[derive(Debug, Deserialize)]
struct ApeWisdomItem {
    ticker: Option<String>,
    mentions: Option<i64>,
    mentions_24h_ago: Option<i64>,
    sentiment: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct TradestieItem {
    ticker: Option<String>,
    no_of_comments: Option<i64>,
    sentiment_score: Option<f64>,
}

/// Trending-stocks client: ApeWisdom primary, Tradestie fallback
pub struct SocialSentimentService {
    http: Client,
}

impl SocialSentimentService {
    pub fn new() -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { http }
    }

    /// Trending stocks by Reddit mentions, crypto filtered out.
    pub async fn get_trending_stocks(&self, limit: usize) -> Vec<SocialMention> {
        // Over-fetch so the crypto filter does not starve the result
        match self.fetch_apewisdom(limit * 2).await {
            Ok(mentions) if !mentions.is_empty() => {
                tracing::info!("Got {} trending items from ApeWisdom", mentions.len());
                return filter_crypto(mentions, limit);
            }
            Ok(_) => tracing::debug!("ApeWisdom returned no results"),
            Err(e) => tracing::warn!("ApeWisdom failed: {}. Trying Tradestie", e),
        }

        match self.fetch_tradestie(limit * 2).await {
            Ok(mentions) if !mentions.is_empty() => {
                tracing::info!("Got {} trending items from Tradestie", mentions.len());
                filter_crypto(mentions, limit)
            }
            Ok(_) => {
                tracing::warn!("No social sentiment data available from any source");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!("Tradestie failed: {}. No social data", e);
                Vec::new()
            }
        }
    }

    /// Social data for one symbol, if it is on the trending list at all.
    pub async fn get_symbol_social_data(&self, symbol: &str) -> Option<SocialMention> {
        let symbol_upper = symbol.to_uppercase();
        self.get_trending_stocks(100)
            .await
            .into_iter()
            .find(|m| m.symbol == symbol_upper)
    }

    async fn fetch_apewisdom(&self, limit: usize) -> Result<Vec<SocialMention>, SignalError> {
        let url = format!("{}/filter/all-stocks", APEWISDOM_BASE_URL);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| SignalError::ApiError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SignalError::ApiError(format!(
                "ApeWisdom HTTP {}",
                response.status()
            )));
        }

        let parsed: ApeWisdomResponse = response
            .json()
            .await
            .map_err(|e| SignalError::ApiError(e.to_string()))?;

        let mentions = parsed
            .results
            .into_iter()
            .take(limit)
            .enumerate()
            .filter_map(|(idx, item)| {
                let symbol = item.ticker?.to_uppercase();
                if symbol.is_empty() || symbol.len() > 5 {
                    return None;
                }
                Some(SocialMention {
                    symbol,
                    mentions: item.mentions.unwrap_or(0),
                    mentions_24h_ago: item.mentions_24h_ago.unwrap_or(0),
                    sentiment_score: item.sentiment.unwrap_or(0.0),
                    rank: idx as u32 + 1,
                    source: "reddit_multi".to_string(),
                })
            })
            .collect();

        Ok(mentions)
    }

    async fn fetch_tradestie(&self, limit: usize) -> Result<Vec<SocialMention>, SignalError> {
        let response = self
            .http
            .get(TRADESTIE_BASE_URL)
            .send()
            .await
            .map_err(|e| SignalError::ApiError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SignalError::ApiError(format!(
                "Tradestie HTTP {}",
                response.status()
            )));
        }

        let items: Vec<TradestieItem> = response
            .json()
            .await
            .map_err(|e| SignalError::ApiError(e.to_string()))?;

        let mentions = items
            .into_iter()
            .take(limit)
            .enumerate()
            .filter_map(|(idx, item)| {
                let symbol = item.ticker?.to_uppercase();
                if symbol.is_empty() || symbol.len() > 5 {
                    return None;
                }
                let current = item.no_of_comments.unwrap_or(0);
                Some(SocialMention {
                    symbol,
                    mentions: current,
                    // Tradestie has no 24h-ago series, estimate it
                    mentions_24h_ago: (current as f64 * 0.8) as i64,
                    sentiment_score: item.sentiment_score.unwrap_or(0.0),
                    rank: idx as u32 + 1,
                    source: "wallstreetbets".to_string(),
                })
            })
            .collect();

        Ok(mentions)
    }
}

impl Default for SocialSentimentService {
    fn default() -> Self {
        Self::new()
    }
}

fn filter_crypto(mentions: Vec<SocialMention>, limit: usize) -> Vec<SocialMention> {
    let crypto: HashSet<&str> = CRYPTO_TICKERS.iter().copied().collect();
    let mut filtered: Vec<SocialMention> = mentions
        .into_iter()
        .filter(|m| !crypto.contains(m.symbol.as_str()))
        .collect();
    filtered.truncate(limit);
    filtered
}
