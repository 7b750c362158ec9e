use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use signal_core::{
    HistoryStore, SentimentLabel, Signal, SignalCategory, SignalError, SignalHistoryEntry,
    SignalPriority, SignalQuery, SignalStore,
};

fn db_err(e: sqlx::Error) -> SignalError {
    SignalError::DatabaseError(e.to_string())
}

/// SQLite-backed dedup history with a rolling expiry window
pub struct SqliteHistoryStore {
    pool: SqlitePool,
}

impl SqliteHistoryStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the history table if it does not exist.
    pub async fn init(&self) -> Result<(), SignalError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS signal_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                symbol TEXT NOT NULL,
                direction TEXT NOT NULL,
                confidence REAL NOT NULL,
                article_hash TEXT,
                news_title TEXT,
                sentiment_score REAL,
                technical_score REAL,
                price_at_signal REAL,
                created_at TEXT NOT NULL,
                expires_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_history_symbol_direction
            ON signal_history (symbol, direction, expires_at)
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }
}

#[async_trait]
impl HistoryStore for SqliteHistoryStore {
    async fn was_recently_signaled(
        &self,
        symbol: &str,
        direction: SentimentLabel,
    ) -> Result<bool, SignalError> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM signal_history
            WHERE symbol = ? AND direction = ? AND expires_at > ?
            "#,
        )
        .bind(symbol)
        .bind(direction.as_str())
        .bind(Utc::now().to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(count > 0)
    }

    async fn record(&self, entry: &SignalHistoryEntry) -> Result<(), SignalError> {
        sqlx::query(
            r#"
            INSERT INTO signal_history (
                symbol, direction, confidence, article_hash, news_title,
                sentiment_score, technical_score, price_at_signal,
                created_at, expires_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.symbol)
        .bind(entry.direction.as_str())
        .bind(entry.confidence)
        .bind(&entry.article_hash)
        .bind(&entry.news_title)
        .bind(entry.sentiment_score)
        .bind(entry.technical_score)
        .bind(entry.price_at_signal)
        .bind(entry.created_at.to_rfc3339())
        .bind(entry.expires_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, SignalError> {
        let result = sqlx::query("DELETE FROM signal_history WHERE expires_at <= ?")
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected())
    }
}

/// Internal DB row with String dates
#[derive(Debug, FromRow)]
struct SignalRow {
    id: Option<i64>,
    symbol: Option<String>,
    title: String,
    summary: String,
    explanation: Option<String>,
    how_to_trade: Option<String>,
    sentiment_score: Option<f64>,
    confidence_score: Option<f64>,
    priority: String,
    category: String,
    source: Option<String>,
    metadata: Option<String>,
    created_at: String,
    expires_at: Option<String>,
}

impl SignalRow {
    fn into_signal(self) -> Signal {
        Signal {
            id: self.id,
            symbol: self.symbol,
            title: self.title,
            summary: self.summary,
            explanation: self.explanation,
            how_to_trade: self.how_to_trade,
            sentiment_score: self.sentiment_score,
            confidence_score: self.confidence_score,
            priority: self
                .priority
                .parse::<SignalPriority>()
                .unwrap_or(SignalPriority::Low),
            category: self
                .category
                .parse::<SignalCategory>()
                .unwrap_or(SignalCategory::MarketContext),
            source: self.source,
            metadata: self.metadata.and_then(|m| serde_json::from_str(&m).ok()),
            created_at: self
                .created_at
                .parse::<DateTime<Utc>>()
                .unwrap_or_else(|_| Utc::now()),
            expires_at: self
                .expires_at
                .and_then(|s| s.parse::<DateTime<Utc>>().ok()),
        }
    }
}

/// SQLite-backed store for generated signals
pub struct SqliteSignalStore {
    pool: SqlitePool,
}

impl SqliteSignalStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn init(&self) -> Result<(), SignalError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS signals (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                symbol TEXT,
                title TEXT NOT NULL,
                summary TEXT NOT NULL,
                explanation TEXT,
                how_to_trade TEXT,
                sentiment_score REAL,
                confidence_score REAL,
                priority TEXT NOT NULL,
                category TEXT NOT NULL,
                source TEXT,
                metadata TEXT,
                created_at TEXT NOT NULL,
                expires_at TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_signals_created_at
            ON signals (created_at)
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }
}

#[async_trait]
impl SignalStore for SqliteSignalStore {
    async fn save(&self, signal: &Signal) -> Result<i64, SignalError> {
        let metadata = signal
            .metadata
            .as_ref()
            .map(|m| m.to_string());

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO signals (
                symbol, title, summary, explanation, how_to_trade,
                sentiment_score, confidence_score, priority, category,
                source, metadata, created_at, expires_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&signal.symbol)
        .bind(&signal.title)
        .bind(&signal.summary)
        .bind(&signal.explanation)
        .bind(&signal.how_to_trade)
        .bind(signal.sentiment_score)
        .bind(signal.confidence_score)
        .bind(signal.priority.as_str())
        .bind(signal.category.as_str())
        .bind(&signal.source)
        .bind(metadata)
        .bind(signal.created_at.to_rfc3339())
        .bind(signal.expires_at.map(|d| d.to_rfc3339()))
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(id)
    }

    async fn query(&self, query: &SignalQuery) -> Result<Vec<Signal>, SignalError> {
        let rows: Vec<SignalRow> = if let Some(categories) = &query.categories {
            if categories.is_empty() {
                return Ok(Vec::new());
            }
            let placeholders = vec!["?"; categories.len()].join(", ");
            let sql = format!(
                r#"
                SELECT id, symbol, title, summary, explanation, how_to_trade,
                       sentiment_score, confidence_score, priority, category,
                       source, metadata, created_at, expires_at
                FROM signals
                WHERE created_at >= ? AND category IN ({})
                ORDER BY confidence_score DESC, created_at DESC
                LIMIT ?
                "#,
                placeholders
            );

            let mut q = sqlx::query_as(&sql).bind(query.since.to_rfc3339());
            for category in categories {
                q = q.bind(category.as_str());
            }
            q.bind(query.limit).fetch_all(&self.pool).await.map_err(db_err)?
        } else {
            sqlx::query_as(
                r#"
                SELECT id, symbol, title, summary, explanation, how_to_trade,
                       sentiment_score, confidence_score, priority, category,
                       source, metadata, created_at, expires_at
                FROM signals
                WHERE created_at >= ?
                ORDER BY confidence_score DESC, created_at DESC
                LIMIT ?
                "#,
            )
            .bind(query.since.to_rfc3339())
            .bind(query.limit)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?
        };

        Ok(rows.into_iter().map(|r| r.into_signal()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite")
    }

    fn history_entry(symbol: &str, direction: SentimentLabel, days_left: i64) -> SignalHistoryEntry {
        let now = Utc::now();
        SignalHistoryEntry {
            symbol: symbol.to_string(),
            direction,
            confidence: 0.8,
            article_hash: Some(crate::article_hash("https://example.com/story")),
            news_title: Some("Test headline".to_string()),
            sentiment_score: Some(0.5),
            technical_score: Some(0.3),
            price_at_signal: Some(150.0),
            created_at: now,
            expires_at: now + Duration::days(days_left),
        }
    }

    fn sample_signal(symbol: &str, confidence: f64) -> Signal {
        Signal {
            id: None,
            symbol: Some(symbol.to_string()),
            title: format!("{} momentum signal", symbol),
            summary: "summary".to_string(),
            explanation: Some("why".to_string()),
            how_to_trade: Some("how".to_string()),
            sentiment_score: Some(0.5),
            confidence_score: Some(confidence),
            priority: SignalPriority::Medium,
            category: SignalCategory::WatchList,
            source: Some("news".to_string()),
            metadata: Some(serde_json::json!({"rsi": 42.0})),
            created_at: Utc::now(),
            expires_at: None,
        }
    }

    #[tokio::test]
    async fn dedup_window_blocks_repeat_direction() {
        let pool = test_pool().await;
        let store = SqliteHistoryStore::new(pool);
        store.init().await.unwrap();

        store
            .record(&history_entry("AAPL", SentimentLabel::Positive, 7))
            .await
            .unwrap();

        assert!(store
            .was_recently_signaled("AAPL", SentimentLabel::Positive)
            .await
            .unwrap());
        // Opposite direction is a new signal
        assert!(!store
            .was_recently_signaled("AAPL", SentimentLabel::Negative)
            .await
            .unwrap());
        assert!(!store
            .was_recently_signaled("MSFT", SentimentLabel::Positive)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn expired_entries_do_not_block() {
        let pool = test_pool().await;
        let store = SqliteHistoryStore::new(pool);
        store.init().await.unwrap();

        store
            .record(&history_entry("TSLA", SentimentLabel::Negative, -1))
            .await
            .unwrap();

        assert!(!store
            .was_recently_signaled("TSLA", SentimentLabel::Negative)
            .await
            .unwrap());

        let purged = store.purge_expired().await.unwrap();
        assert_eq!(purged, 1);
    }

    #[tokio::test]
    async fn signals_round_trip_with_ordering() {
        let pool = test_pool().await;
        let store = SqliteSignalStore::new(pool);
        store.init().await.unwrap();

        store.save(&sample_signal("AAPL", 0.4)).await.unwrap();
        store.save(&sample_signal("MSFT", 0.9)).await.unwrap();
        store.save(&sample_signal("NVDA", 0.6)).await.unwrap();

        let query = SignalQuery {
            since: Utc::now() - Duration::hours(1),
            categories: None,
            limit: 10,
        };
        let signals = store.query(&query).await.unwrap();

        assert_eq!(signals.len(), 3);
        assert_eq!(signals[0].symbol.as_deref(), Some("MSFT"));
        assert_eq!(signals[1].symbol.as_deref(), Some("NVDA"));
        assert_eq!(signals[2].symbol.as_deref(), Some("AAPL"));
        assert!(signals[0].id.is_some());
        assert_eq!(signals[0].metadata.as_ref().unwrap()["rsi"], 42.0);
    }

    #[tokio::test]
    async fn category_filter_and_limit() {
        let pool = test_pool().await;
        let store = SqliteSignalStore::new(pool);
        store.init().await.unwrap();

        let mut alert = sample_signal("AAPL", 0.8);
        alert.category = SignalCategory::TradeAlert;
        store.save(&alert).await.unwrap();
        store.save(&sample_signal("MSFT", 0.9)).await.unwrap();
        store.save(&sample_signal("NVDA", 0.7)).await.unwrap();

        let query = SignalQuery {
            since: Utc::now() - Duration::hours(1),
            categories: Some(vec![SignalCategory::WatchList]),
            limit: 1,
        };
        let signals = store.query(&query).await.unwrap();

        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].symbol.as_deref(), Some("MSFT"));
        assert_eq!(signals[0].category, SignalCategory::WatchList);
    }

    #[tokio::test]
    async fn cutoff_excludes_old_signals() {
        let pool = test_pool().await;
        let store = SqliteSignalStore::new(pool);
        store.init().await.unwrap();

        let mut stale = sample_signal("DIS", 0.9);
        stale.created_at = Utc::now() - Duration::hours(48);
        store.save(&stale).await.unwrap();
        store.save(&sample_signal("AAPL", 0.5)).await.unwrap();

        let query = SignalQuery {
            since: Utc::now() - Duration::hours(24),
            categories: None,
            limit: 10,
        };
        let signals = store.query(&query).await.unwrap();

        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].symbol.as_deref(), Some("AAPL"));
    }
}
