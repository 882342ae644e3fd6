//! Trend signal: topical overlap with other recently ingested articles.

use crate::models::Article;
use std::collections::{HashMap, HashSet};

/// Words of this length or shorter carry no topical signal
const MAX_STOPWORD_LEN: usize = 4;
/// Only the first N other recent articles are compared
const COMPARE_LIMIT: usize = 100;
const ISOLATION_SCORE: f64 = 30.0;
const BASE_SCORE: f64 = 50.0;
const POINTS_PER_SHARED_WORD: f64 = 5.0;

/// Score how topical an article is relative to a recent sample.
///
/// Long words (>4 chars) from the target title are intersected with the
/// long title words of up to the first 100 other recent articles. Every
/// shared-word occurrence adds 5 points on top of 50, capped at 100. An
/// article sharing no words with anything recent scores 30, so isolation is
/// penalized rather than neutral. An empty sample gives a neutral 50.
pub fn trend_score(article: &Article, recent_articles: &[Article]) -> f64 {
    if recent_articles.is_empty() {
        return 50.0;
    }

    let target_words = long_title_words(&article.title);
    if target_words.is_empty() {
        return ISOLATION_SCORE;
    }

    let mut shared_counts: HashMap<String, usize> = HashMap::new();
    for other in recent_articles
        .iter()
        .filter(|a| a.id != article.id)
        .take(COMPARE_LIMIT)
    {
        for word in long_title_words(&other.title) {
            if target_words.contains(&word) {
                *shared_counts.entry(word).or_insert(0) += 1;
            }
        }
    }

    let total_shared: usize = shared_counts.values().sum();
    if total_shared == 0 {
        return ISOLATION_SCORE;
    }

    (BASE_SCORE + POINTS_PER_SHARED_WORD * total_shared as f64).min(100.0)
}

fn long_title_words(title: &str) -> HashSet<String> {
    title
        .to_lowercase()
        .split_whitespace()
        .filter(|w| w.len() > MAX_STOPWORD_LEN)
        .map(|w| w.to_string())
        .collect()
}
