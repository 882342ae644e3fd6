//! Personalization signal: how well an article matches the learned profile.

use crate::models::{clamp_score, Article};
use crate::services::preferences::UserPreferences;

const CATEGORY_WEIGHT_SCALE: f64 = 20.0;
const SOURCE_WEIGHT_SCALE: f64 = 15.0;
const KEYWORD_MATCH_POINTS: f64 = 5.0;
const KEYWORD_MATCH_CAP: f64 = 20.0;
const DEPTH_ALIGNMENT_BONUS: f64 = 10.0;

/// Score an article against the user's learned preferences.
///
/// Starts from a neutral 50 and applies independent adjustments for the
/// learned category weight, source weight, interest-keyword matches, and
/// content-depth alignment, clamped to [0, 100]. Without a preference
/// profile there is nothing to personalize against, so the result is
/// exactly 50.
pub fn personalization_score(article: &Article, preferences: Option<&UserPreferences>) -> f64 {
    let Some(prefs) = preferences else {
        return 50.0;
    };

    let mut score = 50.0;

    if let Some(slug) = &article.category_slug {
        if let Some(weight) = prefs.category_weights.get(slug) {
            score += weight * CATEGORY_WEIGHT_SCALE;
        }
    }

    if let Some(source_id) = &article.source_id {
        if let Some(weight) = prefs.source_weights.get(source_id) {
            score += weight * SOURCE_WEIGHT_SCALE;
        }
    }

    let matches = keyword_matches(article, &prefs.interest_keywords);
    score += (matches as f64 * KEYWORD_MATCH_POINTS).min(KEYWORD_MATCH_CAP);

    let depth = article.content_depth.unwrap_or_default();
    if depth == prefs.preferred_depth {
        score += DEPTH_ALIGNMENT_BONUS;
    } else if depth.is_opposite(prefs.preferred_depth) {
        score -= DEPTH_ALIGNMENT_BONUS;
    }

    clamp_score(score)
}

/// Case-insensitive occurrence count of any interest keyword in the
/// article's title or description.
fn keyword_matches(article: &Article, keywords: &[String]) -> usize {
    if keywords.is_empty() {
        return 0;
    }

    let title = article.title.to_lowercase();
    let description = article.description.to_lowercase();

    keywords
        .iter()
        .map(|kw| {
            let kw = kw.to_lowercase();
            count_occurrences(&title, &kw) + count_occurrences(&description, &kw)
        })
        .sum()
}

fn count_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    haystack.matches(needle).count()
}
