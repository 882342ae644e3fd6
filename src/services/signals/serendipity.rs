//! Serendipity signal: rewards unfamiliar-but-plausible content so the feed
//! does not collapse into a filter bubble.

use crate::models::{clamp_score, Article};
use crate::services::preferences::UserPreferences;

const UNSEEN_CATEGORY_BONUS: f64 = 30.0;
const DISLIKED_CATEGORY_BONUS: f64 = 20.0;
const FAMILIAR_CATEGORY_PENALTY: f64 = 20.0;
const KEYWORD_FAMILIARITY_PENALTY: f64 = 5.0;

/// Score how much of a discovery an article would be for this user.
///
/// Categories the user has never given feedback on are the most
/// serendipitous; previously-disliked categories still get a bonus (a second
/// chance beats a bubble); familiar liked categories are penalized. Every
/// interest keyword appearing in the title makes the article less of a
/// discovery. Without preferences there is no notion of familiarity, so the
/// result is a neutral 50.
pub fn serendipity_score(article: &Article, preferences: Option<&UserPreferences>) -> f64 {
    let Some(prefs) = preferences else {
        return 50.0;
    };

    let mut score = 50.0;

    if let Some(slug) = &article.category_slug {
        match prefs.category_weights.get(slug) {
            None => score += UNSEEN_CATEGORY_BONUS,
            Some(w) if *w < 0.0 => score += DISLIKED_CATEGORY_BONUS,
            Some(_) => score -= FAMILIAR_CATEGORY_PENALTY,
        }
    }

    let title = article.title.to_lowercase();
    for keyword in &prefs.interest_keywords {
        if title.contains(&keyword.to_lowercase()) {
            score -= KEYWORD_FAMILIARITY_PENALTY;
        }
    }

    clamp_score(score)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article_in(slug: &str, title: &str) -> Article {
        let mut article = Article::new(title, "", "https://example.com/a");
        article.category_slug = Some(slug.to_string());
        article
    }

    #[test]
    fn test_no_preferences_is_neutral() {
        let article = article_in("tech", "New framework released");
        assert_eq!(serendipity_score(&article, None), 50.0);
    }

    #[test]
    fn test_unseen_category_bonus() {
        let article = article_in("philosophy", "On the nature of attention");
        let prefs = UserPreferences::default();
        assert_eq!(serendipity_score(&article, Some(&prefs)), 80.0);
    }

    #[test]
    fn test_disliked_category_second_chance() {
        let article = article_in("sports", "Underdog takes the title");
        let mut prefs = UserPreferences::default();
        prefs.category_weights.insert("sports".to_string(), -0.6);
        assert_eq!(serendipity_score(&article, Some(&prefs)), 70.0);
    }

    #[test]
    fn test_familiar_category_penalty() {
        let article = article_in("tech", "Another release announcement");
        let mut prefs = UserPreferences::default();
        prefs.category_weights.insert("tech".to_string(), 0.8);
        assert_eq!(serendipity_score(&article, Some(&prefs)), 30.0);
    }

    #[test]
    fn test_keyword_familiarity_penalty() {
        let article = article_in("philosophy", "Rust and attention in modern tooling");
        let mut prefs = UserPreferences::default();
        prefs.interest_keywords = vec!["rust".to_string(), "attention".to_string()];
        // Unseen category +30, two familiar keywords -10
        assert_eq!(serendipity_score(&article, Some(&prefs)), 70.0);
    }

    #[test]
    fn test_clamped_to_range() {
        let article = article_in("tech", "rust tokio async serde tracing");
        let mut prefs = UserPreferences::default();
        prefs.category_weights.insert("tech".to_string(), 1.0);
        prefs.interest_keywords = vec![
            "rust".to_string(),
            "tokio".to_string(),
            "async".to_string(),
            "serde".to_string(),
            "tracing".to_string(),
        ];
        let score = serendipity_score(&article, Some(&prefs));
        assert!((0.0..=100.0).contains(&score));
        assert_eq!(score, 5.0);
    }
}
