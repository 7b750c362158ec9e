//! Human-readable explanation and trade-plan text attached to each signal.

use sentiment_analysis::tone_summary;
use signal_core::{CrossDirection, SentimentLabel, TechnicalSnapshot};

/// "WHY THIS MATTERS" block summarizing what drove the signal
pub fn explanation(
    headline: Option<&str>,
    news_score: f64,
    tech_score: f64,
    combined: f64,
    snapshot: &TechnicalSnapshot,
) -> String {
    let mut lines = vec!["WHY THIS MATTERS:".to_string()];
    if let Some(title) = headline {
        lines.push(format!("- Catalyst: {}", title));
    }
    lines.push(format!(
        "- News sentiment: {} ({:+.2})",
        tone_summary(news_score),
        news_score
    ));
    lines.push(format!(
        "- Technical score: {:+.2}{}",
        tech_score,
        technical_drivers(snapshot)
    ));
    lines.push(format!("- Combined signal strength: {:+.2}", combined));
    lines.join("\n")
}

fn technical_drivers(snapshot: &TechnicalSnapshot) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(rsi) = snapshot.rsi {
        if rsi < 30.0 {
            parts.push(format!("RSI {:.1} oversold", rsi));
        } else if rsi > 70.0 {
            parts.push(format!("RSI {:.1} overbought", rsi));
        }
    }

    if let Some(macd) = &snapshot.macd {
        match macd.crossover {
            Some(CrossDirection::Bullish) => parts.push("MACD bullish crossover".to_string()),
            Some(CrossDirection::Bearish) => parts.push("MACD bearish crossover".to_string()),
            None => {}
        }
    }

    if let Some(ma) = &snapshot.moving_averages {
        if ma.golden_cross {
            parts.push("golden cross in place".to_string());
        } else if ma.death_cross {
            parts.push("death cross in place".to_string());
        }
    }

    if snapshot.high_volume() {
        parts.push("volume running above average".to_string());
    }

    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

/// "HOW TO TRADE" block with entry, stop, and target levels off the
/// current price
pub fn trade_plan(direction: SentimentLabel, price: f64) -> String {
    match direction {
        SentimentLabel::Positive => format!(
            "HOW TO TRADE:\n\
             - Entry zone: ${:.2} - ${:.2} (current ${:.2})\n\
             - Stop loss: ${:.2}\n\
             - Targets: ${:.2}, then ${:.2}",
            price * 1.005,
            price * 1.01,
            price,
            price * 0.97,
            price * 1.05,
            price * 1.10
        ),
        SentimentLabel::Negative => format!(
            "HOW TO TRADE:\n\
             - Short entry near ${:.2}\n\
             - Stop loss: ${:.2}\n\
             - Target: ${:.2}",
            price,
            price * 1.03,
            price * 0.95
        ),
        SentimentLabel::Neutral => format!(
            "HOW TO TRADE:\n\
             - No edge yet at ${:.2}\n\
             - Bullish above ${:.2}, bearish below ${:.2}",
            price,
            price * 1.02,
            price * 0.98
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use signal_core::QuoteData;

    fn bare_snapshot(rsi: Option<f64>) -> TechnicalSnapshot {
        TechnicalSnapshot {
            symbol: "AAPL".to_string(),
            quote: QuoteData {
                symbol: "AAPL".to_string(),
                price: 100.0,
                change: 1.0,
                change_percent: 1.0,
                volume: 1_000_000.0,
                day_high: None,
                day_low: None,
                previous_close: None,
            },
            rsi,
            macd: None,
            moving_averages: None,
            volume: None,
            levels: None,
            as_of: Utc::now(),
        }
    }

    #[test]
    fn bullish_plan_levels() {
        let plan = trade_plan(SentimentLabel::Positive, 100.0);
        assert!(plan.contains("Entry zone: $100.50 - $101.00"));
        assert!(plan.contains("Stop loss: $97.00"));
        assert!(plan.contains("Targets: $105.00, then $110.00"));
    }

    #[test]
    fn bearish_plan_levels() {
        let plan = trade_plan(SentimentLabel::Negative, 100.0);
        assert!(plan.contains("Short entry near $100.00"));
        assert!(plan.contains("Stop loss: $103.00"));
        assert!(plan.contains("Target: $95.00"));
    }

    #[test]
    fn neutral_plan_has_both_triggers() {
        let plan = trade_plan(SentimentLabel::Neutral, 100.0);
        assert!(plan.contains("Bullish above $102.00"));
        assert!(plan.contains("bearish below $98.00"));
    }

    #[test]
    fn explanation_names_the_catalyst_and_drivers() {
        let text = explanation(
            Some("Acme beats earnings"),
            0.65,
            0.3,
            0.55,
            &bare_snapshot(Some(25.0)),
        );
        assert!(text.contains("WHY THIS MATTERS:"));
        assert!(text.contains("Catalyst: Acme beats earnings"));
        assert!(text.contains("Very Bullish"));
        assert!(text.contains("RSI 25.0 oversold"));
        assert!(text.contains("+0.55"));
    }

    #[test]
    fn explanation_without_headline_or_extremes() {
        let text = explanation(None, 0.0, 0.1, 0.06, &bare_snapshot(Some(50.0)));
        assert!(!text.contains("Catalyst"));
        assert!(!text.contains("RSI"));
    }
}
