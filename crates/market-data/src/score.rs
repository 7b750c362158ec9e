use signal_core::{CrossDirection, ScoreWeights, TechnicalSnapshot};

/// Score a technical snapshot in [-1.0, 1.0].
///
/// Missing indicator groups contribute nothing. Volume only confirms an
/// existing directional lean, it never creates one.
pub fn technical_score(snapshot: &TechnicalSnapshot, weights: &ScoreWeights) -> f64 {
    let mut score = 0.0;

    if let Some(rsi) = snapshot.rsi {
        score += if rsi < 30.0 {
            weights.rsi_extreme
        } else if rsi > 70.0 {
            -weights.rsi_extreme
        } else if (40.0..=60.0).contains(&rsi) {
            0.0
        } else {
            (50.0 - rsi) / 100.0
        };
    }

    if let Some(macd) = snapshot.macd {
        match macd.crossover {
            Some(CrossDirection::Bullish) => score += weights.macd_crossover,
            Some(CrossDirection::Bearish) => score -= weights.macd_crossover,
            None => {}
        }
    }

    if let Some(ma) = snapshot.moving_averages {
        if ma.above_ema_20 {
            score += weights.above_ema;
        }
        if ma.above_ema_50 {
            score += weights.above_ema;
        }
        if ma.above_ema_200 {
            score += weights.above_ema;
        }
        if ma.golden_cross {
            score += weights.trend_cross;
        } else if ma.death_cross {
            score -= weights.trend_cross;
        }
    }

    if let Some(vol) = snapshot.volume {
        if vol.ratio_20d > weights.volume_ratio_threshold {
            if score > 0.0 {
                score += weights.volume_confirm;
            } else if score < 0.0 {
                score -= weights.volume_confirm;
            }
        }
    }

    score.clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use signal_core::{MacdIndicator, MovingAverages, QuoteData, VolumeProfile};

    fn quote(symbol: &str) -> QuoteData {
        QuoteData {
            symbol: symbol.to_string(),
            price: 100.0,
            change: 1.0,
            change_percent: 1.0,
            volume: 1_000_000.0,
            day_high: Some(101.0),
            day_low: Some(98.0),
            previous_close: Some(99.0),
        }
    }

    fn empty_snapshot() -> TechnicalSnapshot {
        TechnicalSnapshot {
            symbol: "AAPL".to_string(),
            quote: quote("AAPL"),
            rsi: None,
            macd: None,
            moving_averages: None,
            volume: None,
            levels: None,
            as_of: Utc::now(),
        }
    }

    fn bullish_mas() -> MovingAverages {
        MovingAverages {
            ema_20: 98.0,
            ema_50: 95.0,
            ema_200: Some(90.0),
            above_ema_20: true,
            above_ema_50: true,
            above_ema_200: true,
            golden_cross: true,
            death_cross: false,
        }
    }

    fn high_volume_profile() -> VolumeProfile {
        VolumeProfile {
            current: 2_000_000.0,
            avg_20d: 1_000_000.0,
            avg_50d: 1_100_000.0,
            ratio_20d: 2.0,
            ratio_50d: 1.8,
            high_volume: true,
        }
    }

    #[test]
    fn empty_snapshot_scores_zero() {
        let snap = empty_snapshot();
        assert_eq!(technical_score(&snap, &ScoreWeights::default()), 0.0);
    }

    #[test]
    fn oversold_rsi_is_bullish() {
        let mut snap = empty_snapshot();
        snap.rsi = Some(25.0);
        let score = technical_score(&snap, &ScoreWeights::default());
        assert!((score - 0.3).abs() < 1e-9);
    }

    #[test]
    fn overbought_rsi_is_bearish() {
        let mut snap = empty_snapshot();
        snap.rsi = Some(80.0);
        let score = technical_score(&snap, &ScoreWeights::default());
        assert!((score + 0.3).abs() < 1e-9);
    }

    #[test]
    fn mid_band_rsi_is_neutral() {
        let mut snap = empty_snapshot();
        snap.rsi = Some(55.0);
        assert_eq!(technical_score(&snap, &ScoreWeights::default()), 0.0);
    }

    #[test]
    fn leaning_rsi_uses_distance_from_midline() {
        let mut snap = empty_snapshot();
        snap.rsi = Some(35.0);
        let score = technical_score(&snap, &ScoreWeights::default());
        assert!((score - 0.15).abs() < 1e-9);

        snap.rsi = Some(65.0);
        let score = technical_score(&snap, &ScoreWeights::default());
        assert!((score + 0.15).abs() < 1e-9);
    }

    #[test]
    fn fully_bullish_snapshot_saturates() {
        let mut snap = empty_snapshot();
        snap.rsi = Some(25.0);
        snap.macd = Some(MacdIndicator {
            macd: 1.2,
            signal: 0.8,
            histogram: 0.4,
            crossover: Some(CrossDirection::Bullish),
        });
        snap.moving_averages = Some(bullish_mas());
        snap.volume = Some(high_volume_profile());

        // 0.3 + 0.25 + 0.3 + 0.15 + 0.15 = 1.15, clamped
        let score = technical_score(&snap, &ScoreWeights::default());
        assert_eq!(score, 1.0);
    }

    #[test]
    fn volume_confirms_but_never_initiates() {
        let mut snap = empty_snapshot();
        snap.volume = Some(high_volume_profile());
        assert_eq!(technical_score(&snap, &ScoreWeights::default()), 0.0);
    }

    #[test]
    fn volume_amplifies_bearish_lean() {
        let mut snap = empty_snapshot();
        snap.rsi = Some(75.0);
        snap.volume = Some(high_volume_profile());
        let score = technical_score(&snap, &ScoreWeights::default());
        assert!((score + 0.45).abs() < 1e-9);
    }

    #[test]
    fn score_stays_in_range() {
        let mut snap = empty_snapshot();
        snap.rsi = Some(95.0);
        snap.macd = Some(MacdIndicator {
            macd: -1.0,
            signal: -0.5,
            histogram: -0.5,
            crossover: Some(CrossDirection::Bearish),
        });
        snap.moving_averages = Some(MovingAverages {
            ema_20: 110.0,
            ema_50: 115.0,
            ema_200: Some(120.0),
            above_ema_20: false,
            above_ema_50: false,
            above_ema_200: false,
            golden_cross: false,
            death_cross: true,
        });
        snap.volume = Some(high_volume_profile());

        // -0.3 - 0.25 - 0.15 - 0.15 = -0.85
        let score = technical_score(&snap, &ScoreWeights::default());
        assert!((-1.0..=1.0).contains(&score));
        assert!((score + 0.85).abs() < 1e-9);
    }
}
