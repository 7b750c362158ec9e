//! Signal engine: fuses news sentiment with technical analysis into
//! actionable signals, with a watchlist scan as fallback when the news
//! cycle is quiet.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use futures_util::stream::{self, StreamExt};

use market_data::score::technical_score;
use sentiment_analysis::{aggregate_sentiment, tone_summary, SentimentScorer};
use signal_core::{
    Article, FusionConfig, HistoryStore, MarketDataProvider, NewsProvider, SentimentLabel,
    SentimentScore, Signal, SignalCategory, SignalError, SignalHistoryEntry, SignalPriority,
    SignalStore, TechnicalSnapshot,
};
use signal_history::article_hash;
use symbol_extractor::{extract_symbols, DEFAULT_MIN_CONFIDENCE};

pub mod templates;

/// How many general-market headlines to pull per news-driven run
const NEWS_FETCH_LIMIT: usize = 50;

/// Headlines pulled per symbol during a watchlist scan
const SYMBOL_NEWS_LIMIT: usize = 5;

/// An article that passed the sentiment filters, tied to its primary symbol
struct NewsCandidate {
    symbol: String,
    article: Article,
    sentiment: SentimentScore,
}

/// Priority ladder: strength decides the tier, with the top tier also
/// requiring conviction (ML confidence or volume confirmation).
pub fn priority_for(combined: f64, ml_confidence: f64, high_volume: bool) -> SignalPriority {
    let strength = combined.abs();
    if strength > 0.7 && (ml_confidence > 0.8 || high_volume) {
        SignalPriority::High
    } else if strength > 0.5 {
        SignalPriority::Medium
    } else {
        SignalPriority::Low
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Confidence first; ties break on the recency of the triggering event
/// (article publish time for news signals, snapshot time for scans).
fn rank_signals(ranked: Vec<(Signal, DateTime<Utc>)>) -> Vec<Signal> {
    let mut ranked = ranked;
    ranked.sort_by(|a, b| {
        b.0.confidence_score
            .unwrap_or(0.0)
            .partial_cmp(&a.0.confidence_score.unwrap_or(0.0))
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.1.cmp(&a.1))
    });
    ranked.into_iter().map(|(signal, _)| signal).collect()
}

pub struct SignalEngine {
    market: Arc<dyn MarketDataProvider>,
    news: Arc<dyn NewsProvider>,
    scorer: SentimentScorer,
    history: Arc<dyn HistoryStore>,
    store: Arc<dyn SignalStore>,
    config: FusionConfig,
}

impl SignalEngine {
    pub fn new(
        market: Arc<dyn MarketDataProvider>,
        news: Arc<dyn NewsProvider>,
        scorer: SentimentScorer,
        history: Arc<dyn HistoryStore>,
        store: Arc<dyn SignalStore>,
        config: FusionConfig,
    ) -> Self {
        Self {
            market,
            news,
            scorer,
            history,
            store,
            config,
        }
    }

    /// Run the full generation pipeline: news-driven first, watchlist scan
    /// when the news cycle yields nothing. Total failure degrades to an
    /// empty batch rather than an error.
    pub async fn generate(&self) -> Result<Vec<Signal>, SignalError> {
        match self.history.purge_expired().await {
            Ok(0) => {}
            Ok(n) => tracing::debug!("Purged {} expired history rows", n),
            Err(e) => tracing::warn!("History purge failed: {}", e),
        }

        match self.generate_news_driven().await {
            Ok(signals) if !signals.is_empty() => return Ok(signals),
            Ok(_) => tracing::info!("No news-driven signals, scanning watchlist"),
            Err(e) => tracing::warn!("News-driven generation failed: {}. Scanning watchlist", e),
        }

        match self.generate_watchlist().await {
            Ok(signals) => Ok(signals),
            Err(e) => {
                tracing::warn!("Watchlist generation failed: {}. No signals this run", e);
                Ok(Vec::new())
            }
        }
    }

    /// Signals driven by fresh headlines: sentiment leads, technicals confirm.
    pub async fn generate_news_driven(&self) -> Result<Vec<Signal>, SignalError> {
        let cfg = self.config.news.clone();

        let articles = self.news.latest_articles(NEWS_FETCH_LIMIT).await?;
        let cutoff = Utc::now() - Duration::hours(cfg.lookback_hours);
        let recent: Vec<Article> = articles
            .into_iter()
            .filter(|a| a.published_at >= cutoff)
            .collect();
        if recent.is_empty() {
            tracing::debug!("No articles within the {}h lookback", cfg.lookback_hours);
            return Ok(Vec::new());
        }

        let annotated = self.scorer.annotate(recent).await;

        // One candidate per symbol, first (freshest) article wins
        let mut seen: HashSet<String> = HashSet::new();
        let mut candidates: Vec<NewsCandidate> = Vec::new();
        for article in annotated {
            let Some(sentiment) = article.sentiment else {
                continue;
            };
            if sentiment.confidence < cfg.min_ml_confidence
                || sentiment.score.abs() < cfg.min_article_sentiment
            {
                continue;
            }
            let Some(primary) = extract_symbols(&article.title, &article.summary, DEFAULT_MIN_CONFIDENCE)
                .into_iter()
                .next()
            else {
                continue;
            };
            if seen.insert(primary.symbol.clone()) {
                candidates.push(NewsCandidate {
                    symbol: primary.symbol,
                    article,
                    sentiment,
                });
            }
        }

        // Dedup against history before spending market-data calls
        let mut fresh: Vec<NewsCandidate> = Vec::new();
        for candidate in candidates {
            let direction = SentimentLabel::from_score(candidate.sentiment.score);
            if self
                .history
                .was_recently_signaled(&candidate.symbol, direction)
                .await?
            {
                tracing::debug!(
                    "Skipping {}: {} signal already active",
                    candidate.symbol,
                    direction.as_str()
                );
                continue;
            }
            fresh.push(candidate);
        }

        // Dropping the stream once the batch is full cancels any snapshot
        // fetch still in flight and dispatches no new ones
        let mut analyzed = std::pin::pin!(stream::iter(fresh)
            .map(|candidate| async move {
                match self.market.get_snapshot(&candidate.symbol).await {
                    Ok(snapshot) => Some((candidate, snapshot)),
                    Err(e) => {
                        tracing::warn!("Snapshot failed for {}: {}", candidate.symbol, e);
                        None
                    }
                }
            })
            .buffer_unordered(self.config.max_concurrency));

        let mut ranked: Vec<(Signal, DateTime<Utc>)> = Vec::new();
        while let Some(result) = analyzed.next().await {
            let Some((candidate, snapshot)) = result else {
                continue;
            };

            let tech = technical_score(&snapshot, &self.config.weights);
            let combined = cfg.news_weight * candidate.sentiment.score + cfg.technical_weight * tech;
            if combined.abs() < cfg.min_combined_score {
                tracing::debug!(
                    "{} below signal threshold ({:+.2})",
                    candidate.symbol,
                    combined
                );
                continue;
            }

            let mut signal = self.assemble_signal(
                &candidate.symbol,
                Some(&candidate.article),
                candidate.sentiment.score,
                candidate.sentiment.confidence,
                tech,
                combined,
                &snapshot,
                "news_fusion",
            );
            self.persist(&mut signal, &candidate.symbol, Some(&candidate.article), tech, combined, &snapshot)
                .await;
            ranked.push((signal, candidate.article.published_at));
            if ranked.len() >= cfg.max_signals {
                break;
            }
        }

        Ok(rank_signals(ranked))
    }

    /// Technicals-led scan over the configured watchlist.
    pub async fn generate_watchlist(&self) -> Result<Vec<Signal>, SignalError> {
        let cfg = self.config.watchlist.clone();

        let mut scanned = std::pin::pin!(stream::iter(cfg.symbols.clone())
            .map(|symbol| self.scan_symbol(symbol))
            .buffer_unordered(self.config.max_concurrency));

        let mut ranked: Vec<(Signal, DateTime<Utc>)> = Vec::new();
        while let Some(result) = scanned.next().await {
            let Some((symbol, snapshot, news)) = result else {
                continue;
            };

            let tech = technical_score(&snapshot, &self.config.weights);
            let combined = cfg.technical_weight * tech + cfg.news_weight * news.score;
            if combined.abs() < cfg.min_combined_score {
                continue;
            }

            let direction = SentimentLabel::from_score(combined);
            if self.history.was_recently_signaled(&symbol, direction).await? {
                tracing::debug!("Skipping {}: {} signal already active", symbol, direction.as_str());
                continue;
            }

            let mut signal = self.assemble_signal(
                &symbol,
                None,
                news.score,
                news.confidence,
                tech,
                combined,
                &snapshot,
                "watchlist_scan",
            );
            self.persist(&mut signal, &symbol, None, tech, combined, &snapshot)
                .await;
            ranked.push((signal, snapshot.as_of));
            if ranked.len() >= cfg.max_signals {
                break;
            }
        }

        Ok(rank_signals(ranked))
    }

    /// Snapshot plus aggregated symbol news; None when market data is down
    /// for the symbol.
    async fn scan_symbol(
        &self,
        symbol: String,
    ) -> Option<(String, TechnicalSnapshot, SentimentScore)> {
        let snapshot = match self.market.get_snapshot(&symbol).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!("Snapshot failed for {}: {}", symbol, e);
                return None;
            }
        };

        let news = match self.news.articles_for_symbol(&symbol, SYMBOL_NEWS_LIMIT).await {
            Ok(articles) if !articles.is_empty() => {
                let annotated = self.scorer.annotate(articles).await;
                aggregate_sentiment(&annotated)
            }
            Ok(_) => SentimentScore::neutral(),
            Err(e) => {
                tracing::debug!("No news for {}: {}", symbol, e);
                SentimentScore::neutral()
            }
        };

        Some((symbol, snapshot, news))
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble_signal(
        &self,
        symbol: &str,
        headline: Option<&Article>,
        news_score: f64,
        ml_confidence: f64,
        tech_score: f64,
        combined: f64,
        snapshot: &TechnicalSnapshot,
        source: &str,
    ) -> Signal {
        let direction = SentimentLabel::from_score(combined);
        let category = SignalCategory::from_combined_score(combined);
        let priority = priority_for(combined, ml_confidence, snapshot.high_volume());
        let price = snapshot.quote.price;
        let now = Utc::now();

        let title = match direction {
            SentimentLabel::Positive => format!("{}: bullish momentum building", symbol),
            SentimentLabel::Negative => format!("{}: bearish pressure mounting", symbol),
            SentimentLabel::Neutral => format!("{}: mixed signals", symbol),
        };
        let summary = match headline {
            Some(article) => article.title.clone(),
            None => format!(
                "Watchlist scan: technical score {:+.2} with {} news tone",
                tech_score,
                tone_summary(news_score)
            ),
        };

        Signal {
            id: None,
            symbol: Some(symbol.to_string()),
            title,
            summary,
            explanation: Some(templates::explanation(
                headline.map(|a| a.title.as_str()),
                news_score,
                tech_score,
                combined,
                snapshot,
            )),
            how_to_trade: Some(templates::trade_plan(direction, price)),
            sentiment_score: Some(round2(combined)),
            confidence_score: Some(round2(combined.abs())),
            priority,
            category,
            source: Some(source.to_string()),
            metadata: Some(serde_json::json!({
                "news_score": round2(news_score),
                "technical_score": round2(tech_score),
                "rsi": snapshot.rsi,
                "price_at_signal": price,
                "article_url": headline.map(|a| a.url.clone()),
            })),
            created_at: now,
            expires_at: Some(now + Duration::days(self.config.dedup_days)),
        }
    }

    /// Record dedup history and save the signal. Persistence failures are
    /// logged but never drop an already generated signal.
    async fn persist(
        &self,
        signal: &mut Signal,
        symbol: &str,
        headline: Option<&Article>,
        tech_score: f64,
        combined: f64,
        snapshot: &TechnicalSnapshot,
    ) {
        let now = Utc::now();
        let entry = SignalHistoryEntry {
            symbol: symbol.to_string(),
            direction: SentimentLabel::from_score(combined),
            confidence: combined.abs(),
            article_hash: headline.map(|a| article_hash(&a.url)),
            news_title: headline.map(|a| a.title.clone()),
            sentiment_score: headline.and_then(|a| a.sentiment.map(|s| s.score)),
            technical_score: Some(tech_score),
            price_at_signal: Some(snapshot.quote.price),
            created_at: now,
            expires_at: now + Duration::days(self.config.dedup_days),
        };

        if let Err(e) = self.history.record(&entry).await {
            tracing::warn!("Failed to record signal history for {}: {}", symbol, e);
        }
        match self.store.save(signal).await {
            Ok(id) => signal.id = Some(id),
            Err(e) => tracing::warn!("Failed to save signal for {}: {}", symbol, e),
        }
    }
}
