//! In-memory store implementations, used by tests and by deployments that
//! do not need persistence across restarts.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use signal_core::{
    HistoryStore, SentimentLabel, Signal, SignalError, SignalHistoryEntry, SignalQuery,
    SignalStore,
};

#[derive(Default)]
pub struct MemoryHistoryStore {
    entries: RwLock<Vec<SignalHistoryEntry>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn was_recently_signaled(
        &self,
        symbol: &str,
        direction: SentimentLabel,
    ) -> Result<bool, SignalError> {
        let now = Utc::now();
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .any(|e| e.symbol == symbol && e.direction == direction && e.expires_at > now))
    }

    async fn record(&self, entry: &SignalHistoryEntry) -> Result<(), SignalError> {
        let mut entries = self.entries.write().await;
        entries.push(entry.clone());
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, SignalError> {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|e| e.expires_at > now);
        Ok((before - entries.len()) as u64)
    }
}

#[derive(Default)]
struct SignalTable {
    signals: Vec<Signal>,
    next_id: i64,
}

#[derive(Default)]
pub struct MemorySignalStore {
    table: RwLock<SignalTable>,
}

impl MemorySignalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SignalStore for MemorySignalStore {
    async fn save(&self, signal: &Signal) -> Result<i64, SignalError> {
        let mut table = self.table.write().await;
        table.next_id += 1;
        let id = table.next_id;

        let mut stored = signal.clone();
        stored.id = Some(id);
        table.signals.push(stored);

        Ok(id)
    }

    async fn query(&self, query: &SignalQuery) -> Result<Vec<Signal>, SignalError> {
        let table = self.table.read().await;

        let mut matched: Vec<Signal> = table
            .signals
            .iter()
            .filter(|s| s.created_at >= query.since)
            .filter(|s| match &query.categories {
                Some(categories) => categories.contains(&s.category),
                None => true,
            })
            .cloned()
            .collect();

        matched.sort_by(|a, b| {
            b.confidence_score
                .unwrap_or(0.0)
                .partial_cmp(&a.confidence_score.unwrap_or(0.0))
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        matched.truncate(query.limit.max(0) as usize);

        Ok(matched)
    }
}
