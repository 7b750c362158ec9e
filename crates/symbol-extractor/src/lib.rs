use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

pub mod companies;

use companies::{COMPANY_TO_TICKER, EXCLUDED_WORDS};

/// Most candidates returned per article
const MAX_CANDIDATES: usize = 5;

/// Confidence floor callers use when they have no stricter requirement
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.5;

/// How the symbol was found in the text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    DollarPrefixed,
    ContextKeyword,
    Parenthetical,
    CompanyName,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMethod::DollarPrefixed => "dollar_prefixed",
            ExtractionMethod::ContextKeyword => "context_keyword",
            ExtractionMethod::Parenthetical => "parenthetical",
            ExtractionMethod::CompanyName => "company_name",
        }
    }
}

/// A ticker candidate with extraction confidence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolCandidate {
    pub symbol: String,
    pub confidence: f64,
    pub method: ExtractionMethod,
}

static DOLLAR_TICKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$([A-Z]{1,5})\b").expect("valid regex"));

static CONTEXT_TICKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([A-Z]{2,5})\s+(?i:stock|shares|equity|ticker|symbol|corporation|corp|inc)\b")
        .expect("valid regex")
});

static PAREN_TICKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(([A-Z]{2,5})\)").expect("valid regex"));

/// Precompiled word-boundary matchers for each known company name
static COMPANY_PATTERNS: Lazy<Vec<(Regex, &'static str, &'static str)>> = Lazy::new(|| {
    COMPANY_TO_TICKER
        .iter()
        .filter_map(|&(name, ticker)| {
            let pattern = format!(r"\b{}\b", regex::escape(name));
            Regex::new(&pattern).ok().map(|re| (re, name, ticker))
        })
        .collect()
});

static EXCLUDED: Lazy<HashSet<&'static str>> =
    Lazy::new(|| EXCLUDED_WORDS.iter().copied().collect());

fn is_excluded(symbol: &str) -> bool {
    EXCLUDED.contains(symbol)
}

/// Tickers found via explicit text patterns, with the method that found them.
///
/// Dollar-prefixed tickers skip the exclusion list: "$THE" is an
/// intentional reference even though "THE" alone never is.
fn pattern_tickers(text: &str) -> HashMap<String, ExtractionMethod> {
    let mut found: HashMap<String, ExtractionMethod> = HashMap::new();

    for cap in DOLLAR_TICKER.captures_iter(text) {
        if let Some(m) = cap.get(1) {
            found
                .entry(m.as_str().to_string())
                .or_insert(ExtractionMethod::DollarPrefixed);
        }
    }

    for cap in CONTEXT_TICKER.captures_iter(text) {
        if let Some(m) = cap.get(1) {
            let symbol = m.as_str();
            if !is_excluded(symbol) {
                found
                    .entry(symbol.to_string())
                    .or_insert(ExtractionMethod::ContextKeyword);
            }
        }
    }

    for cap in PAREN_TICKER.captures_iter(text) {
        if let Some(m) = cap.get(1) {
            let symbol = m.as_str();
            if !is_excluded(symbol) {
                found
                    .entry(symbol.to_string())
                    .or_insert(ExtractionMethod::Parenthetical);
            }
        }
    }

    found
}

/// Company names mapped to tickers, with the name that matched
fn company_tickers(text_lower: &str) -> HashMap<String, &'static str> {
    let mut found: HashMap<String, &'static str> = HashMap::new();
    for (pattern, name, ticker) in COMPANY_PATTERNS.iter() {
        if pattern.is_match(text_lower) {
            found.entry(ticker.to_string()).or_insert(name);
        }
    }
    found
}

fn count_occurrences(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

/// Extract ticker candidates from an article's title and summary.
///
/// Returns at most five candidates at or above `min_confidence`, highest
/// confidence first. A symbol found by several methods keeps its best
/// confidence.
pub fn extract_symbols(title: &str, summary: &str, min_confidence: f64) -> Vec<SymbolCandidate> {
    let text = format!("{} {}", title, summary);
    let text_upper = text.to_uppercase();
    let title_upper = title.to_uppercase();
    let text_lower = text.to_lowercase();
    let title_lower = title.to_lowercase();

    let mut best: HashMap<String, SymbolCandidate> = HashMap::new();

    for (symbol, method) in pattern_tickers(&text) {
        let confidence = if title_upper.contains(&symbol) {
            0.95
        } else if count_occurrences(&text_upper, &symbol) > 2 {
            0.85
        } else {
            0.7
        };

        merge_candidate(
            &mut best,
            SymbolCandidate {
                symbol,
                confidence,
                method,
            },
        );
    }

    for (symbol, name) in company_tickers(&text_lower) {
        let confidence = if title_lower.contains(name) {
            0.9
        } else if count_occurrences(&text_lower, name) > 1 {
            0.75
        } else {
            0.6
        };

        merge_candidate(
            &mut best,
            SymbolCandidate {
                symbol,
                confidence,
                method: ExtractionMethod::CompanyName,
            },
        );
    }

    let mut candidates: Vec<SymbolCandidate> = best.into_values().collect();
    candidates.retain(|c| c.confidence >= min_confidence);
    candidates.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
    candidates.truncate(MAX_CANDIDATES);
    candidates
}

fn merge_candidate(best: &mut HashMap<String, SymbolCandidate>, candidate: SymbolCandidate) {
    match best.get(&candidate.symbol) {
        Some(existing) if existing.confidence >= candidate.confidence => {}
        _ => {
            best.insert(candidate.symbol.clone(), candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dollar_prefixed_ticker_is_found() {
        let candidates = extract_symbols("$AAPL breaks out to new highs", "", DEFAULT_MIN_CONFIDENCE);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].symbol, "AAPL");
        assert_eq!(candidates[0].method, ExtractionMethod::DollarPrefixed);
        assert!((candidates[0].confidence - 0.95).abs() < 1e-9);
    }

    #[test]
    fn dollar_prefix_bypasses_stoplist() {
        let candidates = extract_symbols("Traders pile into $THE", "", DEFAULT_MIN_CONFIDENCE);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].symbol, "THE");
    }

    #[test]
    fn bare_stopword_is_never_a_ticker() {
        let candidates = extract_symbols("THE stock market rallied", "CEO spoke at NYSE", DEFAULT_MIN_CONFIDENCE);
        assert!(candidates.iter().all(|c| c.symbol != "THE"));
        assert!(candidates.iter().all(|c| c.symbol != "CEO"));
        assert!(candidates.iter().all(|c| c.symbol != "NYSE"));
    }

    #[test]
    fn context_keyword_extraction() {
        let candidates = extract_symbols("Analysts upbeat", "TSLA shares climbed 4% on deliveries", DEFAULT_MIN_CONFIDENCE);
        let tsla = candidates.iter().find(|c| c.symbol == "TSLA").expect("TSLA");
        assert_eq!(tsla.method, ExtractionMethod::ContextKeyword);
        assert!((tsla.confidence - 0.7).abs() < 1e-9);
    }

    #[test]
    fn parenthetical_extraction() {
        let candidates = extract_symbols("Chipmaker update", "Advanced Micro Devices (AMD) gains", DEFAULT_MIN_CONFIDENCE);
        let amd = candidates.iter().find(|c| c.symbol == "AMD").expect("AMD");
        assert!((amd.confidence - 0.7).abs() < 1e-9);
    }

    #[test]
    fn company_name_in_title_scores_high() {
        let candidates = extract_symbols("Apple unveils new hardware", "The event ran two hours", DEFAULT_MIN_CONFIDENCE);
        let aapl = candidates.iter().find(|c| c.symbol == "AAPL").expect("AAPL");
        assert_eq!(aapl.method, ExtractionMethod::CompanyName);
        assert!((aapl.confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn company_name_in_body_scores_low() {
        let candidates = extract_symbols("Tech roundup", "A quiet week except for nvidia supply news", DEFAULT_MIN_CONFIDENCE);
        let nvda = candidates.iter().find(|c| c.symbol == "NVDA").expect("NVDA");
        assert!((nvda.confidence - 0.6).abs() < 1e-9);
    }

    #[test]
    fn duplicate_symbol_keeps_best_confidence() {
        // AAPL via $-prefix in title (0.95) and via company name (0.9)
        let candidates = extract_symbols("$AAPL: Apple earnings preview", "", DEFAULT_MIN_CONFIDENCE);
        let aapl: Vec<_> = candidates.iter().filter(|c| c.symbol == "AAPL").collect();
        assert_eq!(aapl.len(), 1);
        assert!((aapl[0].confidence - 0.95).abs() < 1e-9);
        assert_eq!(aapl[0].method, ExtractionMethod::DollarPrefixed);
    }

    #[test]
    fn candidates_are_sorted_and_capped() {
        let title = "Mega movers: $AAPL $MSFT";
        let summary = "Tesla and Amazon rallied while nvidia, meta and netflix slipped";
        let candidates = extract_symbols(title, summary, DEFAULT_MIN_CONFIDENCE);

        assert_eq!(candidates.len(), 5);
        for pair in candidates.windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
        }
    }

    #[test]
    fn lowercase_tickers_are_not_matched() {
        let candidates = extract_symbols("buy aapl now", "$aapl to the moon", DEFAULT_MIN_CONFIDENCE);
        assert!(candidates.iter().all(|c| c.symbol != "AAPL" || c.method == ExtractionMethod::CompanyName));
    }

    #[test]
    fn confidence_floor_filters_weak_candidates() {
        // A body-only company mention scores 0.6
        let candidates = extract_symbols("Tech roundup", "a week of nvidia supply news", 0.7);
        assert!(candidates.is_empty());

        let candidates = extract_symbols("Tech roundup", "a week of nvidia supply news", 0.5);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].symbol, "NVDA");
    }

    #[test]
    fn no_symbols_in_generic_text() {
        let candidates = extract_symbols("Markets mixed at midday", "Traders await inflation data", DEFAULT_MIN_CONFIDENCE);
        assert!(candidates.is_empty());
    }
}
