/// Tunables for news-driven signal generation
#[derive(Debug, Clone)]
pub struct NewsModeConfig {
    pub news_weight: f64,
    pub technical_weight: f64,
    /// Minimum absolute combined score to emit a signal
    pub min_combined_score: f64,
    /// Articles with lower ML confidence are skipped
    pub min_ml_confidence: f64,
    /// Articles with weaker sentiment than this are skipped
    pub min_article_sentiment: f64,
    pub lookback_hours: i64,
    pub max_signals: usize,
}

impl Default for NewsModeConfig {
    fn default() -> Self {
        Self {
            news_weight: 0.7,
            technical_weight: 0.3,
            min_combined_score: 0.3,
            min_ml_confidence: 0.6,
            min_article_sentiment: 0.3,
            lookback_hours: 6,
            max_signals: 10,
        }
    }
}

/// Tunables for watchlist scanning
#[derive(Debug, Clone)]
pub struct WatchlistModeConfig {
    pub technical_weight: f64,
    pub news_weight: f64,
    pub min_combined_score: f64,
    pub max_signals: usize,
    pub symbols: Vec<String>,
}

pub const DEFAULT_WATCHLIST: [&str; 15] = [
    "AAPL", "MSFT", "GOOGL", "AMZN", "NVDA", "META", "TSLA", "AMD", "NFLX", "DIS", "JPM", "BAC",
    "V", "MA", "PYPL",
];

impl Default for WatchlistModeConfig {
    fn default() -> Self {
        Self {
            technical_weight: 0.6,
            news_weight: 0.4,
            min_combined_score: 0.15,
            max_signals: 20,
            symbols: DEFAULT_WATCHLIST.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Contribution of each indicator group to the technical score
#[derive(Debug, Clone)]
pub struct ScoreWeights {
    pub rsi_extreme: f64,
    pub macd_crossover: f64,
    pub above_ema: f64,
    pub trend_cross: f64,
    pub volume_confirm: f64,
    /// 20-day volume ratio above which volume confirms the running score
    pub volume_ratio_threshold: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            rsi_extreme: 0.3,
            macd_crossover: 0.25,
            above_ema: 0.1,
            trend_cross: 0.15,
            volume_confirm: 0.15,
            volume_ratio_threshold: 1.5,
        }
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone)]
pub struct FusionConfig {
    pub news: NewsModeConfig,
    pub watchlist: WatchlistModeConfig,
    pub weights: ScoreWeights,
    /// Days a (symbol, direction) pair stays blocked after a signal
    pub dedup_days: i64,
    /// Bound on concurrent per-symbol analysis tasks
    pub max_concurrency: usize,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            news: NewsModeConfig::default(),
            watchlist: WatchlistModeConfig::default(),
            weights: ScoreWeights::default(),
            dedup_days: 7,
            max_concurrency: 4,
        }
    }
}
