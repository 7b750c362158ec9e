use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use signal_core::{
    Bar, CrossDirection, MacdIndicator, MarketDataProvider, MovingAverages, QuoteData, SignalError,
    TechnicalSnapshot, TtlCache, VolumeProfile,
};

pub mod indicators;
pub mod score;

#[cfg(test)]
mod indicators_tests;

pub use score::technical_score;

const DEFAULT_BASE_URL: &str = "https://api.stockgrid.dev/v1";
const SNAPSHOT_TTL_SECS: i64 = 300; // 5 minutes
const QUOTE_TTL_SECS: i64 = 300;
const BARS_LOOKBACK_DAYS: u32 = 300;
const HIGH_VOLUME_RATIO: f64 = 1.5;

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    symbol: String,
    price: f64,
    change: f64,
    change_percent: f64,
    #[serde(default)]
    volume: f64,
    #[serde(default)]
    day_high: Option<f64>,
    #[serde(default)]
    day_low: Option<f64>,
    #[serde(default)]
    previous_close: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct BarsResponse {
    #[serde(default)]
    bars: Vec<BarRow>,
}

#[derive(Debug, Deserialize)]
struct BarRow {
    t: i64,
    o: f64,
    h: f64,
    l: f64,
    c: f64,
    v: f64,
}

/// HTTP client for the quote/OHLCV API
#[derive(Clone)]
pub struct MarketApiClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl MarketApiClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            base_url,
            api_key,
            client,
        }
    }

    pub fn from_env() -> Self {
        let base_url =
            std::env::var("MARKET_DATA_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let api_key = std::env::var("MARKET_DATA_API_KEY").unwrap_or_default();
        Self::new(base_url, api_key)
    }

    /// Send a request with one automatic retry on 429.
    async fn send_request(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, SignalError> {
        let request = builder
            .build()
            .map_err(|e| SignalError::ApiError(e.to_string()))?;

        for attempt in 0..2u32 {
            let req_clone = request
                .try_clone()
                .ok_or_else(|| SignalError::ApiError("Cannot clone request".to_string()))?;
            let response = self
                .client
                .execute(req_clone)
                .await
                .map_err(|e| SignalError::ApiError(e.to_string()))?;

            if response.status().as_u16() != 429 {
                return Ok(response);
            }

            tracing::warn!("Market data API rate limited, retry {}/2", attempt + 1);
            tokio::time::sleep(Duration::from_secs(2)).await;
        }

        Err(SignalError::ApiError(
            "Rate limited by market data API".to_string(),
        ))
    }

    pub async fn get_quote(&self, symbol: &str) -> Result<QuoteData, SignalError> {
        let url = format!("{}/quote/{}", self.base_url, symbol);
        let response = self
            .send_request(self.client.get(&url).query(&[("apiKey", &self.api_key)]))
            .await?;

        if !response.status().is_success() {
            return Err(SignalError::ApiError(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let quote: QuoteResponse = response
            .json()
            .await
            .map_err(|e| SignalError::ApiError(e.to_string()))?;

        Ok(QuoteData {
            symbol: quote.symbol,
            price: quote.price,
            change: quote.change,
            change_percent: quote.change_percent,
            volume: quote.volume,
            day_high: quote.day_high,
            day_low: quote.day_low,
            previous_close: quote.previous_close,
        })
    }

    pub async fn get_daily_bars(&self, symbol: &str, days: u32) -> Result<Vec<Bar>, SignalError> {
        let url = format!("{}/bars/{}", self.base_url, symbol);
        let response = self
            .send_request(self.client.get(&url).query(&[
                ("apiKey", self.api_key.as_str()),
                ("timespan", "day"),
                ("days", &days.to_string()),
            ]))
            .await?;

        if !response.status().is_success() {
            return Err(SignalError::ApiError(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let bars: BarsResponse = response
            .json()
            .await
            .map_err(|e| SignalError::ApiError(e.to_string()))?;

        Ok(bars
            .bars
            .into_iter()
            .filter_map(|r| {
                DateTime::from_timestamp_millis(r.t).map(|timestamp| Bar {
                    timestamp,
                    open: r.o,
                    high: r.h,
                    low: r.l,
                    close: r.c,
                    volume: r.v,
                })
            })
            .collect())
    }
}

/// Quote and technical snapshot provider with short-TTL caching
pub struct MarketDataService {
    client: MarketApiClient,
    quote_cache: TtlCache<QuoteData>,
    snapshot_cache: TtlCache<TechnicalSnapshot>,
}

impl MarketDataService {
    pub fn new(client: MarketApiClient) -> Self {
        Self {
            client,
            quote_cache: TtlCache::new(QUOTE_TTL_SECS),
            snapshot_cache: TtlCache::new(SNAPSHOT_TTL_SECS),
        }
    }

    pub fn from_env() -> Self {
        Self::new(MarketApiClient::from_env())
    }
}

#[async_trait]
impl MarketDataProvider for MarketDataService {
    async fn get_quote(&self, symbol: &str) -> Result<QuoteData, SignalError> {
        if let Some(quote) = self.quote_cache.get(symbol) {
            return Ok(quote);
        }

        let quote = self.client.get_quote(symbol).await?;
        self.quote_cache.insert(symbol, quote.clone());
        Ok(quote)
    }

    async fn get_snapshot(&self, symbol: &str) -> Result<TechnicalSnapshot, SignalError> {
        if let Some(snapshot) = self.snapshot_cache.get(symbol) {
            return Ok(snapshot);
        }

        let (quote_result, bars_result) = tokio::join!(
            self.client.get_quote(symbol),
            self.client.get_daily_bars(symbol, BARS_LOOKBACK_DAYS),
        );

        // A snapshot without a quote is useless; missing bars just mean
        // the indicator groups stay empty.
        let quote = quote_result?;
        let bars = match bars_result {
            Ok(bars) => bars,
            Err(e) => {
                tracing::warn!("No historical bars for {}: {}", symbol, e);
                Vec::new()
            }
        };

        let snapshot = build_snapshot(symbol, quote, &bars, Utc::now());
        self.snapshot_cache.insert(symbol, snapshot.clone());
        Ok(snapshot)
    }
}

/// Compute the full indicator set from a quote and daily bars.
pub fn build_snapshot(
    symbol: &str,
    quote: QuoteData,
    bars: &[Bar],
    as_of: DateTime<Utc>,
) -> TechnicalSnapshot {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

    let rsi = indicators::rsi(&closes, 14).last().copied();
    let macd = latest_macd(&closes);
    let moving_averages = latest_moving_averages(&closes, quote.price);
    let volume = volume_profile(bars);
    let levels = if bars.len() >= 22 {
        Some(indicators::support_resistance(bars, 20))
    } else {
        None
    };

    TechnicalSnapshot {
        symbol: symbol.to_string(),
        quote,
        rsi,
        macd,
        moving_averages,
        volume,
        levels,
        as_of,
    }
}

fn latest_macd(closes: &[f64]) -> Option<MacdIndicator> {
    let series = indicators::macd(closes, 12, 26, 9);
    let macd = *series.macd_line.last()?;
    let signal = *series.signal_line.last()?;
    let histogram = *series.histogram.last()?;

    let crossover = if histogram > 0.0 {
        Some(CrossDirection::Bullish)
    } else {
        Some(CrossDirection::Bearish)
    };

    Some(MacdIndicator {
        macd,
        signal,
        histogram,
        crossover,
    })
}

fn latest_moving_averages(closes: &[f64], price: f64) -> Option<MovingAverages> {
    if closes.len() < 50 {
        return None;
    }

    let ema_20 = *indicators::ema(closes, 20).last()?;
    let ema_50 = *indicators::ema(closes, 50).last()?;
    let ema_200 = if closes.len() >= 200 {
        indicators::ema(closes, 200).last().copied()
    } else {
        None
    };

    Some(MovingAverages {
        ema_20,
        ema_50,
        ema_200,
        above_ema_20: price > ema_20,
        above_ema_50: price > ema_50,
        above_ema_200: ema_200.map(|e| price > e).unwrap_or(false),
        golden_cross: ema_200.map(|e| ema_50 > e).unwrap_or(false),
        death_cross: ema_200.map(|e| ema_50 < e).unwrap_or(false),
    })
}

fn volume_profile(bars: &[Bar]) -> Option<VolumeProfile> {
    if bars.len() < 20 {
        return None;
    }

    let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();
    let current = *volumes.last()?;

    let tail_mean = |n: usize| {
        let n = n.min(volumes.len());
        volumes[volumes.len() - n..].iter().sum::<f64>() / n as f64
    };
    let avg_20d = tail_mean(20);
    let avg_50d = tail_mean(50);

    if avg_20d <= 0.0 || avg_50d <= 0.0 {
        return None;
    }

    Some(VolumeProfile {
        current,
        avg_20d,
        avg_50d,
        ratio_20d: current / avg_20d,
        ratio_50d: current / avg_50d,
        high_volume: current > avg_20d * HIGH_VOLUME_RATIO,
    })
}
