use signal_core::{Article, SentimentLabel, SentimentScore};

pub mod ml;

pub use ml::MlSentimentClient;

/// Financial market keywords for the lexical fallback
const BULLISH_KEYWORDS: &[&str] = &[
    "bull",
    "bullish",
    "rally",
    "surge",
    "soar",
    "climb",
    "gain",
    "rise",
    "upgrade",
    "outperform",
    "beat",
    "exceed",
    "strong",
    "growth",
    "positive",
    "optimistic",
    "breakthrough",
    "expansion",
    "profit",
    "revenue",
    "earnings beat",
    "buy rating",
    "price target raised",
];

const BEARISH_KEYWORDS: &[&str] = &[
    "bear",
    "bearish",
    "decline",
    "fall",
    "drop",
    "plunge",
    "crash",
    "downgrade",
    "underperform",
    "miss",
    "weak",
    "loss",
    "negative",
    "pessimistic",
    "concern",
    "risk",
    "uncertainty",
    "volatility",
    "sell rating",
    "price target lowered",
    "guidance lowered",
];

/// Keyword density at which lexical intensity saturates
const INTENSITY_SATURATION: f64 = 5.0;

/// Per-article decay when aggregating freshness-sorted articles
const AGGREGATION_DECAY: f64 = 0.9;

/// Article count at which aggregate confidence saturates
const CONFIDENCE_SATURATION: f64 = 10.0;

/// Keyword-balance sentiment estimate.
///
/// Score is the bullish/bearish balance scaled by keyword density, so a
/// single stray keyword stays weak while keyword-dense text can reach the
/// full range.
pub fn lexical_score(text: &str) -> SentimentScore {
    let text_lower = text.to_lowercase();

    let bullish = BULLISH_KEYWORDS
        .iter()
        .filter(|kw| text_lower.contains(*kw))
        .count() as f64;
    let bearish = BEARISH_KEYWORDS
        .iter()
        .filter(|kw| text_lower.contains(*kw))
        .count() as f64;

    let total = bullish + bearish;
    if total == 0.0 {
        return SentimentScore::neutral();
    }

    let balance = (bullish - bearish) / total;
    let intensity = (total / INTENSITY_SATURATION).min(1.0);
    let score = (balance * intensity).clamp(-1.0, 1.0);

    SentimentScore {
        score,
        confidence: intensity,
        label: SentimentLabel::from_score(score),
    }
}

/// Sentiment scorer: FinBERT service when available, lexical fallback
pub struct SentimentScorer {
    ml_client: Option<MlSentimentClient>,
}

impl SentimentScorer {
    pub fn new(ml_client: Option<MlSentimentClient>) -> Self {
        Self { ml_client }
    }

    pub fn from_env() -> Self {
        let ml_client = std::env::var("ML_SENTIMENT_URL")
            .ok()
            .filter(|url| !url.is_empty())
            .map(|url| MlSentimentClient::new(url, std::time::Duration::from_secs(5)));
        Self::new(ml_client)
    }

    pub fn lexical_only() -> Self {
        Self::new(None)
    }

    /// Score a single piece of text.
    pub async fn score_text(&self, text: &str) -> SentimentScore {
        if let Some(client) = &self.ml_client {
            match client.score(text).await {
                Ok(score) => return score,
                Err(e) => {
                    tracing::debug!("FinBERT unavailable, falling back to word-list: {}", e);
                }
            }
        }
        lexical_score(text)
    }

    /// Score each article and attach the result.
    pub async fn annotate(&self, articles: Vec<Article>) -> Vec<Article> {
        let mut annotated = Vec::with_capacity(articles.len());
        for mut article in articles {
            let score = self.score_text(&article.full_text()).await;
            article.sentiment = Some(score);
            annotated.push(article);
        }
        annotated
    }
}

/// Aggregate scored articles into one symbol-level sentiment.
///
/// Articles are freshness-sorted first; each position decays the weight by
/// 0.9 so stale coverage cannot drown out the latest story. Aggregate
/// confidence grows with article count and saturates at ten.
pub fn aggregate_sentiment(articles: &[Article]) -> SentimentScore {
    let mut sorted: Vec<&Article> = articles.iter().filter(|a| a.sentiment.is_some()).collect();
    if sorted.is_empty() {
        return SentimentScore::neutral();
    }
    sorted.sort_by(|a, b| b.published_at.cmp(&a.published_at));

    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    for (i, article) in sorted.iter().enumerate() {
        let weight = AGGREGATION_DECAY.powi(i as i32);
        if let Some(sentiment) = article.sentiment {
            weighted_sum += sentiment.score * weight;
            weight_total += weight;
        }
    }

    let score = (weighted_sum / weight_total).clamp(-1.0, 1.0);
    let confidence = (sorted.len() as f64 / CONFIDENCE_SATURATION).min(1.0);

    SentimentScore {
        score,
        confidence,
        label: SentimentLabel::from_score(score),
    }
}

/// Human-readable tone label for digests
pub fn tone_summary(score: f64) -> &'static str {
    if score >= 0.6 {
        "Very Bullish"
    } else if score >= 0.2 {
        "Bullish"
    } else if score >= -0.2 {
        "Neutral"
    } else if score >= -0.6 {
        "Bearish"
    } else {
        "Very Bearish"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn scored_article(score: f64, hours_ago: i64) -> Article {
        Article {
            title: "title".to_string(),
            summary: "summary".to_string(),
            url: "https://example.com".to_string(),
            source: "test".to_string(),
            published_at: Utc::now() - Duration::hours(hours_ago),
            sentiment: Some(SentimentScore {
                score,
                confidence: 0.8,
                label: SentimentLabel::from_score(score),
            }),
        }
    }

    #[test]
    fn no_keywords_is_neutral() {
        let result = lexical_score("The weather was pleasant today");
        assert_eq!(result.score, 0.0);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.label, SentimentLabel::Neutral);
    }

    #[test]
    fn bullish_text_scores_positive() {
        let result = lexical_score("Shares surge on strong growth and record profit");
        assert!(result.score > 0.0);
        assert_eq!(result.label, SentimentLabel::Positive);
    }

    #[test]
    fn bearish_text_scores_negative() {
        let result = lexical_score("Stock plunges on weak guidance, downgrade follows");
        assert!(result.score < 0.0);
        assert_eq!(result.label, SentimentLabel::Negative);
    }

    #[test]
    fn single_keyword_is_dampened() {
        // One bullish keyword: balance 1.0, intensity 1/5
        let result = lexical_score("Analysts see upgrade");
        assert!((result.score - 0.2).abs() < 1e-9);
        assert!((result.confidence - 0.2).abs() < 1e-9);
    }

    #[test]
    fn dense_keywords_saturate_intensity() {
        let result =
            lexical_score("surge rally climb gain rise growth profit beat exceed strong");
        assert!(result.score > 0.9);
        assert!((result.confidence - 1.0).abs() < 1e-9);
    }

    #[test]
    fn mixed_keywords_partially_cancel() {
        // 1 bullish + 1 bearish: balance 0, score 0
        let result = lexical_score("gain offset by loss");
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn score_stays_in_range() {
        for text in [
            "surge surge surge rally rally profit growth strong beat exceed",
            "crash crash plunge decline loss weak miss downgrade bear fall",
        ] {
            let result = lexical_score(text);
            assert!((-1.0..=1.0).contains(&result.score));
        }
    }

    #[test]
    fn aggregate_of_nothing_is_neutral() {
        let result = aggregate_sentiment(&[]);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.label, SentimentLabel::Neutral);
    }

    #[test]
    fn aggregate_weights_fresh_articles_more() {
        // Newest strongly positive, older strongly negative: weights 1.0 vs 0.9
        let articles = vec![scored_article(1.0, 1), scored_article(-1.0, 10)];
        let result = aggregate_sentiment(&articles);
        let expected = (1.0 - 0.9) / 1.9;
        assert!((result.score - expected).abs() < 1e-9);
        assert_eq!(result.label, SentimentLabel::Positive);
    }

    #[test]
    fn aggregate_order_in_input_does_not_matter() {
        let a = vec![scored_article(0.8, 1), scored_article(-0.4, 20)];
        let b = vec![scored_article(-0.4, 20), scored_article(0.8, 1)];
        let ra = aggregate_sentiment(&a);
        let rb = aggregate_sentiment(&b);
        assert!((ra.score - rb.score).abs() < 1e-9);
    }

    #[test]
    fn aggregate_confidence_scales_with_count() {
        let articles: Vec<Article> = (0..4).map(|i| scored_article(0.5, i)).collect();
        let result = aggregate_sentiment(&articles);
        assert!((result.confidence - 0.4).abs() < 1e-9);

        let many: Vec<Article> = (0..15).map(|i| scored_article(0.5, i)).collect();
        assert!((aggregate_sentiment(&many).confidence - 1.0).abs() < 1e-9);
    }

    #[test]
    fn unscored_articles_are_ignored() {
        let mut unscored = scored_article(0.9, 1);
        unscored.sentiment = None;
        let articles = vec![unscored, scored_article(-0.5, 2)];
        let result = aggregate_sentiment(&articles);
        assert!((result.score + 0.5).abs() < 1e-9);
    }

    #[test]
    fn tone_summary_bands() {
        assert_eq!(tone_summary(0.7), "Very Bullish");
        assert_eq!(tone_summary(0.3), "Bullish");
        assert_eq!(tone_summary(0.0), "Neutral");
        assert_eq!(tone_summary(-0.3), "Bearish");
        assert_eq!(tone_summary(-0.7), "Very Bearish");
    }
}
