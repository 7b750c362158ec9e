use serde::{Deserialize, Serialize};
use std::time::Duration;

use signal_core::{SentimentLabel, SentimentScore, SignalError};

#[derive(Debug, Clone, Serialize)]
struct PredictRequest {
    texts: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Prediction {
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct PredictResponse {
    predictions: Vec<Prediction>,
}

/// Client for the FinBERT sentiment sidecar service
#[derive(Clone)]
pub struct MlSentimentClient {
    client: reqwest::Client,
    base_url: String,
}

impl MlSentimentClient {
    pub fn new(base_url: String, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { client, base_url }
    }

    /// Score one text. Score is P(positive) - P(negative), confidence the
    /// winning class probability.
    pub async fn score(&self, text: &str) -> Result<SentimentScore, SignalError> {
        let scores = self.score_batch(vec![text.to_string()]).await?;
        scores
            .into_iter()
            .next()
            .ok_or_else(|| SignalError::ApiError("Empty prediction response".to_string()))
    }

    pub async fn score_batch(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<SentimentScore>, SignalError> {
        let request = PredictRequest { texts };

        let response = self
            .client
            .post(format!("{}/predict", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| SignalError::ApiError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SignalError::ApiError(format!(
                "Sentiment service HTTP {}",
                response.status()
            )));
        }

        let parsed: PredictResponse = response
            .json()
            .await
            .map_err(|e| SignalError::ApiError(e.to_string()))?;

        Ok(parsed
            .predictions
            .into_iter()
            .map(score_from_prediction)
            .collect())
    }

    pub async fn health(&self) -> bool {
        match self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

fn score_from_prediction(p: Prediction) -> SentimentScore {
    let score = (p.positive - p.negative).clamp(-1.0, 1.0);
    let confidence = p.positive.max(p.negative).max(p.neutral).clamp(0.0, 1.0);

    let label = if p.positive >= p.negative && p.positive >= p.neutral {
        SentimentLabel::Positive
    } else if p.negative >= p.positive && p.negative >= p.neutral {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    };

    SentimentScore {
        score,
        confidence,
        label,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prediction_maps_to_probability_gap() {
        let score = score_from_prediction(Prediction {
            positive: 0.8,
            negative: 0.1,
            neutral: 0.1,
        });
        assert!((score.score - 0.7).abs() < 1e-9);
        assert!((score.confidence - 0.8).abs() < 1e-9);
        assert_eq!(score.label, SentimentLabel::Positive);
    }

    #[test]
    fn neutral_dominant_prediction() {
        let score = score_from_prediction(Prediction {
            positive: 0.2,
            negative: 0.1,
            neutral: 0.7,
        });
        assert_eq!(score.label, SentimentLabel::Neutral);
        assert!((score.score - 0.1).abs() < 1e-9);
        assert!((score.confidence - 0.7).abs() < 1e-9);
    }

    #[test]
    fn bearish_prediction_is_negative() {
        let score = score_from_prediction(Prediction {
            positive: 0.05,
            negative: 0.9,
            neutral: 0.05,
        });
        assert!(score.score < -0.8);
        assert_eq!(score.label, SentimentLabel::Negative);
    }
}
