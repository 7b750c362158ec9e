#[cfg(test)]
mod tests {
    use super::super::indicators::*;
    use chrono::Utc;
    use signal_core::Bar;

    // Helper function to create sample price data
    fn sample_prices() -> Vec<f64> {
        vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03,
            45.61, 46.28, 46.28, 46.00, 46.03, 46.41, 46.22, 45.64,
        ]
    }

    fn bars_from_ohlc(prices: Vec<(f64, f64, f64, f64)>) -> Vec<Bar> {
        let n = prices.len() as i64;
        prices
            .into_iter()
            .enumerate()
            .map(|(i, (open, high, low, close))| Bar {
                timestamp: Utc::now() - chrono::Duration::days(n - i as i64),
                open,
                high,
                low,
                close,
                volume: 1_000_000.0,
            })
            .collect()
    }

    #[test]
    fn test_sma_basic() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = sma(&data, 3);

        assert_eq!(result.len(), 3);
        assert!((result[0] - 2.0).abs() < 0.001); // (1+2+3)/3 = 2
        assert!((result[1] - 3.0).abs() < 0.001); // (2+3+4)/3 = 3
        assert!((result[2] - 4.0).abs() < 0.001); // (3+4+5)/3 = 4
    }

    #[test]
    fn test_sma_insufficient_data() {
        let data = vec![1.0, 2.0];
        let result = sma(&data, 5);

        assert_eq!(result.len(), 0);
    }

    #[test]
    fn test_ema_starts_with_sma() {
        let data = vec![22.0, 24.0, 23.0, 25.0, 26.0];
        let result = ema(&data, 3);

        // One value per input from index period-1 onward
        assert_eq!(result.len(), data.len() - 3 + 1);
        let first_sma = (22.0 + 24.0 + 23.0) / 3.0;
        assert!((result[0] - first_sma).abs() < 0.01);
    }

    #[test]
    fn test_ema_aligns_with_sma_length() {
        let prices = sample_prices();
        assert_eq!(ema(&prices, 5).len(), sma(&prices, 5).len());
    }

    #[test]
    fn test_ema_empty_data() {
        let data: Vec<f64> = vec![];
        let result = ema(&data, 5);

        assert_eq!(result.len(), 0);
    }

    #[test]
    fn test_ema_increases_with_uptrend() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        let result = ema(&data, 3);

        for i in 1..result.len() {
            assert!(result[i] > result[i - 1]);
        }
    }

    #[test]
    fn test_rsi_bounded() {
        let prices = sample_prices();
        let result = rsi(&prices, 14);

        assert!(!result.is_empty());
        for &value in &result {
            assert!((0.0..=100.0).contains(&value));
        }
    }

    #[test]
    fn test_rsi_all_gains_is_100() {
        let data: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let result = rsi(&data, 14);

        assert!(!result.is_empty());
        for &value in &result {
            assert!((value - 100.0).abs() < 0.001);
        }
    }

    #[test]
    fn test_rsi_insufficient_data() {
        let data = vec![1.0, 2.0, 3.0];
        let result = rsi(&data, 14);

        assert_eq!(result.len(), 0);
    }

    #[test]
    fn test_macd_produces_histogram() {
        let prices: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0).collect();
        let result = macd(&prices, 12, 26, 9);

        assert!(!result.macd_line.is_empty());
        assert!(!result.signal_line.is_empty());
        assert_eq!(result.histogram.len(), result.signal_line.len());
    }

    #[test]
    fn test_macd_invalid_periods() {
        let prices = sample_prices();
        let result = macd(&prices, 26, 12, 9);

        assert!(result.macd_line.is_empty());
    }

    #[test]
    fn test_support_resistance_detects_levels() {
        // A valley then a peak inside the lookback window
        let mut ohlc = Vec::new();
        for i in 0..30 {
            let base = match i {
                10 => 90.0,  // swing low
                20 => 115.0, // swing high
                _ => 100.0 + (i as f64 % 3.0),
            };
            ohlc.push((base, base + 1.0, base - 1.0, base));
        }
        let bars = bars_from_ohlc(ohlc);

        let levels = support_resistance(&bars, 25);
        assert!(levels.support.is_some());
        assert!(levels.resistance.is_some());
        let last_close = bars.last().map(|b| b.close).unwrap_or_default();
        if let Some(support) = levels.support {
            assert!(support < last_close);
        }
        if let Some(resistance) = levels.resistance {
            assert!(resistance > last_close);
        }
    }

    #[test]
    fn test_support_resistance_insufficient_data() {
        let bars = bars_from_ohlc(vec![(100.0, 101.0, 99.0, 100.0); 5]);
        let levels = support_resistance(&bars, 20);

        assert!(levels.support.is_none());
        assert!(levels.resistance.is_none());
    }
}
