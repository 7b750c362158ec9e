use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// News article after aggregation, optionally annotated with sentiment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub summary: String,
    pub url: String,
    pub source: String,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub sentiment: Option<SentimentScore>,
}

impl Article {
    /// Title plus summary, the text fed to sentiment and symbol extraction
    pub fn full_text(&self) -> String {
        format!("{} {}", self.title, self.summary)
    }
}

/// OHLCV bar data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Sentiment direction label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub fn from_score(score: f64) -> Self {
        if score > 0.0 {
            SentimentLabel::Positive
        } else if score < 0.0 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

impl std::str::FromStr for SentimentLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(SentimentLabel::Positive),
            "negative" => Ok(SentimentLabel::Negative),
            "neutral" => Ok(SentimentLabel::Neutral),
            other => Err(format!("unknown sentiment label: {}", other)),
        }
    }
}

/// Scored sentiment for a piece of text
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SentimentScore {
    /// -1.0 (bearish) to 1.0 (bullish)
    pub score: f64,
    /// 0.0 to 1.0
    pub confidence: f64,
    pub label: SentimentLabel,
}

impl SentimentScore {
    pub fn neutral() -> Self {
        Self {
            score: 0.0,
            confidence: 0.0,
            label: SentimentLabel::Neutral,
        }
    }
}

/// Real-time quote for a symbol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteData {
    pub symbol: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub volume: f64,
    pub day_high: Option<f64>,
    pub day_low: Option<f64>,
    pub previous_close: Option<f64>,
}

/// MACD crossover direction detected on the most recent bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrossDirection {
    Bullish,
    Bearish,
}

/// MACD values for the latest bar
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MacdIndicator {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
    #[serde(default)]
    pub crossover: Option<CrossDirection>,
}

/// Exponential moving averages and trend state.
///
/// `ema_200` needs 200 bars of history; when it is None the long-trend
/// flags (above_ema_200, golden_cross, death_cross) stay false.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MovingAverages {
    pub ema_20: f64,
    pub ema_50: f64,
    pub ema_200: Option<f64>,
    pub above_ema_20: bool,
    pub above_ema_50: bool,
    pub above_ema_200: bool,
    pub golden_cross: bool,
    pub death_cross: bool,
}

/// Volume relative to its recent averages
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VolumeProfile {
    pub current: f64,
    pub avg_20d: f64,
    pub avg_50d: f64,
    pub ratio_20d: f64,
    pub ratio_50d: f64,
    pub high_volume: bool,
}

/// Nearest support/resistance levels from recent swing points
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SupportResistance {
    pub support: Option<f64>,
    pub resistance: Option<f64>,
}

/// Point-in-time technical picture for a symbol.
///
/// Indicator groups are optional: a missing group means the data to compute
/// it was unavailable, and it contributes nothing to scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicalSnapshot {
    pub symbol: String,
    pub quote: QuoteData,
    pub rsi: Option<f64>,
    pub macd: Option<MacdIndicator>,
    pub moving_averages: Option<MovingAverages>,
    pub volume: Option<VolumeProfile>,
    pub levels: Option<SupportResistance>,
    pub as_of: DateTime<Utc>,
}

impl TechnicalSnapshot {
    pub fn high_volume(&self) -> bool {
        self.volume.map(|v| v.high_volume).unwrap_or(false)
    }
}

/// Signal category buckets by strength
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalCategory {
    TradeAlert,
    WatchList,
    MarketContext,
}

impl SignalCategory {
    /// Bucket a combined score by absolute strength
    pub fn from_combined_score(score: f64) -> Self {
        let strength = score.abs();
        if strength > 0.6 {
            SignalCategory::TradeAlert
        } else if strength > 0.4 {
            SignalCategory::WatchList
        } else {
            SignalCategory::MarketContext
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalCategory::TradeAlert => "trade_alert",
            SignalCategory::WatchList => "watch_list",
            SignalCategory::MarketContext => "market_context",
        }
    }
}

impl std::str::FromStr for SignalCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trade_alert" => Ok(SignalCategory::TradeAlert),
            "watch_list" => Ok(SignalCategory::WatchList),
            "market_context" => Ok(SignalCategory::MarketContext),
            other => Err(format!("unknown signal category: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalPriority {
    High,
    Medium,
    Low,
}

impl SignalPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalPriority::High => "high",
            SignalPriority::Medium => "medium",
            SignalPriority::Low => "low",
        }
    }
}

impl std::str::FromStr for SignalPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(SignalPriority::High),
            "medium" => Ok(SignalPriority::Medium),
            "low" => Ok(SignalPriority::Low),
            other => Err(format!("unknown signal priority: {}", other)),
        }
    }
}

/// A generated trading signal or market-context item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    #[serde(default)]
    pub id: Option<i64>,
    pub symbol: Option<String>,
    pub title: String,
    pub summary: String,
    pub explanation: Option<String>,
    pub how_to_trade: Option<String>,
    pub sentiment_score: Option<f64>,
    pub confidence_score: Option<f64>,
    pub priority: SignalPriority,
    pub category: SignalCategory,
    pub source: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Filter for querying stored signals
#[derive(Debug, Clone)]
pub struct SignalQuery {
    pub since: DateTime<Utc>,
    pub categories: Option<Vec<SignalCategory>>,
    pub limit: i64,
}

/// Row recorded when a signal is emitted, used for deduplication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalHistoryEntry {
    pub symbol: String,
    pub direction: SentimentLabel,
    pub confidence: f64,
    pub article_hash: Option<String>,
    pub news_title: Option<String>,
    pub sentiment_score: Option<f64>,
    pub technical_score: Option<f64>,
    pub price_at_signal: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_buckets_by_absolute_strength() {
        assert_eq!(
            SignalCategory::from_combined_score(0.75),
            SignalCategory::TradeAlert
        );
        assert_eq!(
            SignalCategory::from_combined_score(-0.75),
            SignalCategory::TradeAlert
        );
        assert_eq!(
            SignalCategory::from_combined_score(0.5),
            SignalCategory::WatchList
        );
        assert_eq!(
            SignalCategory::from_combined_score(-0.45),
            SignalCategory::WatchList
        );
        assert_eq!(
            SignalCategory::from_combined_score(0.3),
            SignalCategory::MarketContext
        );
        assert_eq!(
            SignalCategory::from_combined_score(0.0),
            SignalCategory::MarketContext
        );
    }

    #[test]
    fn category_boundaries_are_exclusive() {
        // Exactly 0.6 is watch list, exactly 0.4 is market context
        assert_eq!(
            SignalCategory::from_combined_score(0.6),
            SignalCategory::WatchList
        );
        assert_eq!(
            SignalCategory::from_combined_score(0.4),
            SignalCategory::MarketContext
        );
    }

    #[test]
    fn label_from_score_signs() {
        assert_eq!(SentimentLabel::from_score(0.4), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::from_score(-0.2), SentimentLabel::Negative);
        assert_eq!(SentimentLabel::from_score(0.0), SentimentLabel::Neutral);
    }

    #[test]
    fn label_round_trips_through_str() {
        for label in [
            SentimentLabel::Positive,
            SentimentLabel::Negative,
            SentimentLabel::Neutral,
        ] {
            assert_eq!(label.as_str().parse::<SentimentLabel>(), Ok(label));
        }
    }
}
