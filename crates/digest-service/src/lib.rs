//! Digest assembly: recent signals plus a market-context header with the
//! major index levels and the VIX volatility regime.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use signal_core::{
    MarketDataProvider, QuoteData, Signal, SignalCategory, SignalError, SignalQuery, SignalStore,
    TtlCache,
};

/// Digests are stable enough to cache for two hours
const DIGEST_CACHE_TTL_SECS: i64 = 7200;

/// VIX level assumed when the quote is unavailable
const VIX_FALLBACK_LEVEL: f64 = 15.5;

const INDICES: &[(&str, &str)] = &[
    ("SPY", "S&P 500"),
    ("DIA", "Dow Jones"),
    ("QQQ", "Nasdaq 100"),
    ("VIX", "Volatility Index"),
];

/// Parameters for building a digest
#[derive(Debug, Clone)]
pub struct DigestRequest {
    pub hours_lookback: i64,
    pub max_items: i64,
    pub categories: Option<Vec<SignalCategory>>,
}

impl Default for DigestRequest {
    fn default() -> Self {
        Self {
            hours_lookback: 24,
            max_items: 20,
            categories: None,
        }
    }
}

/// One major index line in the digest header
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketIndex {
    pub symbol: String,
    pub name: String,
    pub level: f64,
    /// Formatted percent change, "N/A" when the quote failed
    pub change: String,
    pub raw_change: f64,
}

/// Volatility regime derived from the VIX level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VixRegime {
    pub level: f64,
    pub regime: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestResponse {
    pub generated_at: DateTime<Utc>,
    pub items: Vec<Signal>,
    pub total_items: usize,
    pub market_context: Vec<MarketIndex>,
    pub vix_regime: VixRegime,
}

/// Bucket a VIX level into a named regime
pub fn vix_regime(level: f64) -> VixRegime {
    let (regime, description) = if level < 15.0 {
        ("LOW_VOL", "Low volatility - favorable for momentum strategies")
    } else if level < 20.0 {
        ("NORMAL", "Normal volatility - balanced market conditions")
    } else if level < 30.0 {
        ("ELEVATED", "Elevated volatility - caution advised")
    } else {
        ("HIGH_VOL", "High volatility - risk-off environment")
    };

    VixRegime {
        level,
        regime: regime.to_string(),
        description: description.to_string(),
    }
}

fn index_entry(symbol: &str, name: &str, quote: Result<QuoteData, SignalError>) -> MarketIndex {
    match quote {
        Ok(q) => MarketIndex {
            symbol: symbol.to_string(),
            name: name.to_string(),
            level: q.price,
            change: format!("{:+.2}%", q.change_percent),
            raw_change: q.change_percent,
        },
        Err(e) => {
            tracing::warn!("Quote failed for {}: {}", symbol, e);
            MarketIndex {
                symbol: symbol.to_string(),
                name: name.to_string(),
                level: 0.0,
                change: "N/A".to_string(),
                raw_change: 0.0,
            }
        }
    }
}

fn cache_key(request: &DigestRequest) -> String {
    let categories = match &request.categories {
        Some(cats) => cats
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(","),
        None => "all".to_string(),
    };
    format!(
        "digest:{}:{}:{}",
        request.hours_lookback, request.max_items, categories
    )
}

pub struct DigestService {
    store: Arc<dyn SignalStore>,
    market: Arc<dyn MarketDataProvider>,
    cache: TtlCache<DigestResponse>,
}

impl DigestService {
    pub fn new(store: Arc<dyn SignalStore>, market: Arc<dyn MarketDataProvider>) -> Self {
        Self {
            store,
            market,
            cache: TtlCache::new(DIGEST_CACHE_TTL_SECS),
        }
    }

    pub async fn build(&self, request: &DigestRequest) -> Result<DigestResponse, SignalError> {
        let key = cache_key(request);
        if let Some(cached) = self.cache.get(&key) {
            tracing::debug!("Digest cache hit for {}", key);
            return Ok(cached);
        }

        let since = Utc::now() - Duration::hours(request.hours_lookback);
        let items = self
            .store
            .query(&SignalQuery {
                since,
                categories: request.categories.clone(),
                limit: request.max_items,
            })
            .await?;

        let (market_context, vix) = self.market_context().await;

        let response = DigestResponse {
            generated_at: Utc::now(),
            total_items: items.len(),
            items,
            market_context,
            vix_regime: vix,
        };
        self.cache.insert(key, response.clone());

        Ok(response)
    }

    /// Index levels plus the VIX regime. Quote failures degrade to
    /// placeholder entries instead of failing the digest.
    async fn market_context(&self) -> (Vec<MarketIndex>, VixRegime) {
        let (spy, dia, qqq, vix) = tokio::join!(
            self.market.get_quote(INDICES[0].0),
            self.market.get_quote(INDICES[1].0),
            self.market.get_quote(INDICES[2].0),
            self.market.get_quote(INDICES[3].0),
        );

        let vix_level = vix.as_ref().map(|q| q.price).ok();

        let indices = vec![
            index_entry(INDICES[0].0, INDICES[0].1, spy),
            index_entry(INDICES[1].0, INDICES[1].1, dia),
            index_entry(INDICES[2].0, INDICES[2].1, qqq),
            index_entry(INDICES[3].0, INDICES[3].1, vix),
        ];

        let regime = vix_regime(vix_level.unwrap_or(VIX_FALLBACK_LEVEL));

        (indices, regime)
    }
}
