use async_trait::async_trait;

use crate::{
    Article, QuoteData, Signal, SignalError, SignalHistoryEntry, SignalQuery, SentimentLabel,
    TechnicalSnapshot,
};

/// Source of quotes and technical snapshots
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn get_quote(&self, symbol: &str) -> Result<QuoteData, SignalError>;

    /// Full technical picture. Indicator groups the provider cannot compute
    /// are left as None rather than failing the whole snapshot.
    async fn get_snapshot(&self, symbol: &str) -> Result<TechnicalSnapshot, SignalError>;
}

/// Source of market news headlines
#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Latest general market headlines, newest first
    async fn latest_articles(&self, max_articles: usize) -> Result<Vec<Article>, SignalError>;

    /// Headlines mentioning a specific symbol, newest first
    async fn articles_for_symbol(
        &self,
        symbol: &str,
        max_articles: usize,
    ) -> Result<Vec<Article>, SignalError>;
}

/// Deduplication history for emitted signals
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// True if a live (unexpired) signal exists for this symbol and direction
    async fn was_recently_signaled(
        &self,
        symbol: &str,
        direction: SentimentLabel,
    ) -> Result<bool, SignalError>;

    async fn record(&self, entry: &SignalHistoryEntry) -> Result<(), SignalError>;

    /// Remove expired rows, returning how many were deleted
    async fn purge_expired(&self) -> Result<u64, SignalError>;
}

/// Persistent store for generated signals
#[async_trait]
pub trait SignalStore: Send + Sync {
    async fn save(&self, signal: &Signal) -> Result<i64, SignalError>;

    async fn query(&self, query: &SignalQuery) -> Result<Vec<Signal>, SignalError>;
}
