//! Learned user-interest profile and the feedback-driven learner that
//! rebuilds it. The learner is a full recompute over the feedback history:
//! running it twice on the same snapshot produces identical output, so
//! last-writer-wins is safe if two passes ever race for the same user.

use crate::config::LearnerConfig;
use crate::models::{Article, ContentDepth, Feedback};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

/// One user's learned profile. Mutated only by [`PreferenceLearner`] output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPreferences {
    pub user_id: Uuid,
    /// Most significant first, capped by the learner
    pub interest_keywords: Vec<String>,
    /// category slug -> weight in [-1, 1]; no entry means "unknown",
    /// which is distinct from a neutral 0
    pub category_weights: HashMap<String, f64>,
    /// source id -> weight in [-1, 1]
    pub source_weights: HashMap<Uuid, f64>,
    pub preferred_depth: ContentDepth,
    pub total_feedback_count: u64,
    pub last_updated: DateTime<Utc>,
}

impl UserPreferences {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            interest_keywords: Vec::new(),
            category_weights: HashMap::new(),
            source_weights: HashMap::new(),
            preferred_depth: ContentDepth::default(),
            total_feedback_count: 0,
            last_updated: Utc::now(),
        }
    }

    /// Replace the learned fields wholesale with a fresh learning pass
    pub fn apply(&mut self, profile: LearnedProfile) {
        self.interest_keywords = profile.interest_keywords;
        self.category_weights = profile.category_weights;
        self.source_weights = profile.source_weights;
        self.total_feedback_count = profile.total_feedback_count;
        self.last_updated = Utc::now();
    }
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self::new(Uuid::nil())
    }
}

/// Output of one learning pass, ready to be applied to a profile
#[derive(Debug, Clone, PartialEq)]
pub struct LearnedProfile {
    pub interest_keywords: Vec<String>,
    pub category_weights: HashMap<String, f64>,
    pub source_weights: HashMap<Uuid, f64>,
    pub total_feedback_count: u64,
}

/// Rebuilds a [`LearnedProfile`] from the full feedback history.
pub struct PreferenceLearner {
    config: LearnerConfig,
}

impl PreferenceLearner {
    pub fn new(config: LearnerConfig) -> Self {
        Self { config }
    }

    /// Recompute category weights, source weights, and interest keywords
    /// from every feedback-tagged article in the snapshot. Articles with
    /// neutral feedback contribute nothing.
    pub fn relearn(&self, articles: &[Article]) -> LearnedProfile {
        let liked: Vec<&Article> = articles
            .iter()
            .filter(|a| a.feedback == Feedback::Like)
            .collect();
        let disliked: Vec<&Article> = articles
            .iter()
            .filter(|a| a.feedback == Feedback::Dislike)
            .collect();

        let category_weights = weight_by_key(&liked, &disliked, |a| a.category_slug.clone());
        let source_weights = weight_by_key(&liked, &disliked, |a| a.source_id);
        let interest_keywords = self.extract_keywords(&liked);

        let profile = LearnedProfile {
            interest_keywords,
            category_weights,
            source_weights,
            total_feedback_count: (liked.len() + disliked.len()) as u64,
        };

        info!(
            liked = liked.len(),
            disliked = disliked.len(),
            keywords = profile.interest_keywords.len(),
            categories = profile.category_weights.len(),
            "preference learning pass complete"
        );

        profile
    }

    /// Top keywords by frequency across the titles of the most recently
    /// published liked articles. Ties keep first-seen order.
    fn extract_keywords(&self, liked: &[&Article]) -> Vec<String> {
        let mut sample: Vec<&Article> = liked.to_vec();
        sample.sort_by(|a, b| b.pub_date.cmp(&a.pub_date));
        sample.truncate(self.config.keyword_sample_size);

        let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
        let mut order = 0usize;

        for article in &sample {
            for word in article.title.to_lowercase().split_whitespace() {
                if word.len() <= 4 {
                    continue;
                }
                let entry = counts.entry(word.to_string()).or_insert_with(|| {
                    let slot = (0, order);
                    order += 1;
                    slot
                });
                entry.0 += 1;
            }
        }

        let mut ranked: Vec<(String, (usize, usize))> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
        ranked.truncate(self.config.max_keywords);

        debug!(keywords = ranked.len(), "extracted interest keywords");
        ranked.into_iter().map(|(word, _)| word).collect()
    }
}

/// Per-key weight: (liked - disliked) / total, rounded to 2 decimals.
/// Keys with zero feedback get no entry at all.
fn weight_by_key<K, F>(liked: &[&Article], disliked: &[&Article], key_of: F) -> HashMap<K, f64>
where
    K: std::hash::Hash + Eq,
    F: Fn(&Article) -> Option<K>,
{
    let mut counts: HashMap<K, (i64, i64)> = HashMap::new();

    for article in liked {
        if let Some(key) = key_of(article) {
            counts.entry(key).or_insert((0, 0)).0 += 1;
        }
    }
    for article in disliked {
        if let Some(key) = key_of(article) {
            counts.entry(key).or_insert((0, 0)).1 += 1;
        }
    }

    counts
        .into_iter()
        .map(|(key, (likes, dislikes))| {
            let total = likes + dislikes;
            let weight = (likes - dislikes) as f64 / total as f64;
            (key, (weight * 100.0).round() / 100.0)
        })
        .collect()
}

/// Counts feedback events per user and decides when a relearn is due.
///
/// The trigger scope is deliberately per-user: a global counter would let
/// one user's feedback schedule another user's learning pass.
#[derive(Debug, Default)]
pub struct FeedbackTracker {
    interval: u32,
    counts: HashMap<Uuid, u32>,
}

impl FeedbackTracker {
    pub fn new(interval: u32) -> Self {
        Self {
            interval: interval.max(1),
            counts: HashMap::new(),
        }
    }

    /// Record one feedback event. Returns true when this user has reached a
    /// multiple of the configured interval.
    pub fn record(&mut self, user_id: Uuid) -> bool {
        let count = self.counts.entry(user_id).or_insert(0);
        *count += 1;
        *count % self.interval == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn learner() -> PreferenceLearner {
        PreferenceLearner::new(LearnerConfig::default())
    }

    fn feedback_article(title: &str, category: &str, feedback: Feedback) -> Article {
        let mut article = Article::new(title, "", "https://example.com/a");
        article.category_slug = Some(category.to_string());
        article.feedback = feedback;
        article
    }

    #[test]
    fn test_category_weight_formula() {
        let articles = vec![
            feedback_article("a", "tech", Feedback::Like),
            feedback_article("b", "tech", Feedback::Like),
            feedback_article("c", "tech", Feedback::Like),
            feedback_article("d", "tech", Feedback::Dislike),
        ];

        let profile = learner().relearn(&articles);
        // (3 - 1) / 4 = 0.5
        assert_eq!(profile.category_weights["tech"], 0.5);
        assert_eq!(profile.total_feedback_count, 4);
    }

    #[test]
    fn test_unknown_category_has_no_entry() {
        let articles = vec![feedback_article("a", "tech", Feedback::Like)];
        let profile = learner().relearn(&articles);
        assert!(!profile.category_weights.contains_key("science"));
        assert_eq!(profile.category_weights["tech"], 1.0);
    }

    #[test]
    fn test_neutral_articles_ignored() {
        let articles = vec![
            feedback_article("a", "tech", Feedback::Neutral),
            feedback_article("b", "tech", Feedback::Dislike),
        ];
        let profile = learner().relearn(&articles);
        assert_eq!(profile.category_weights["tech"], -1.0);
        assert_eq!(profile.total_feedback_count, 1);
    }

    #[test]
    fn test_source_weights() {
        let source = Uuid::new_v4();
        let mut liked = feedback_article("a", "tech", Feedback::Like);
        liked.source_id = Some(source);
        let mut disliked = feedback_article("b", "tech", Feedback::Dislike);
        disliked.source_id = Some(source);

        let profile = learner().relearn(&[liked, disliked]);
        assert_eq!(profile.source_weights[&source], 0.0);
    }

    #[test]
    fn test_weight_rounded_two_decimals() {
        let articles = vec![
            feedback_article("a", "tech", Feedback::Like),
            feedback_article("b", "tech", Feedback::Like),
            feedback_article("c", "tech", Feedback::Dislike),
        ];
        let profile = learner().relearn(&articles);
        // (2 - 1) / 3 = 0.333... -> 0.33
        assert_eq!(profile.category_weights["tech"], 0.33);
    }

    #[test]
    fn test_keyword_extraction_frequency_and_order() {
        let articles = vec![
            feedback_article("quantum computing advances today", "tech", Feedback::Like),
            feedback_article("quantum hardware milestone", "tech", Feedback::Like),
            feedback_article("gardening through winter", "home", Feedback::Like),
        ];

        let profile = learner().relearn(&articles);
        // "quantum" appears twice, everything else once
        assert_eq!(profile.interest_keywords[0], "quantum");
        // Short words are dropped
        assert!(!profile.interest_keywords.contains(&"today".to_string()));
        assert!(profile.interest_keywords.contains(&"computing".to_string()));
    }

    #[test]
    fn test_keyword_sample_most_recent_liked() {
        let mut articles = Vec::new();
        // 60 liked articles, oldest first; only the 50 newest count
        for i in 0..60 {
            let mut a = feedback_article(
                if i < 10 { "ancient subject" } else { "current subject" },
                "tech",
                Feedback::Like,
            );
            a.pub_date = Utc::now() - Duration::days(60 - i);
            articles.push(a);
        }

        let profile = learner().relearn(&articles);
        assert!(!profile.interest_keywords.contains(&"ancient".to_string()));
        assert!(profile.interest_keywords.contains(&"current".to_string()));
    }

    #[test]
    fn test_keyword_cap() {
        let mut titles = String::new();
        for i in 0..30 {
            titles.push_str(&format!("keyword{:02} ", i));
        }
        let articles = vec![feedback_article(&titles, "tech", Feedback::Like)];

        let profile = learner().relearn(&articles);
        assert_eq!(profile.interest_keywords.len(), 20);
        // Ties broken by first-seen order
        assert_eq!(profile.interest_keywords[0], "keyword00");
        assert_eq!(profile.interest_keywords[19], "keyword19");
    }

    #[test]
    fn test_relearn_is_idempotent() {
        let articles = vec![
            feedback_article("quantum computing advances", "tech", Feedback::Like),
            feedback_article("football scores tonight", "sports", Feedback::Dislike),
        ];

        let first = learner().relearn(&articles);
        let second = learner().relearn(&articles);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_history_empty_profile() {
        let profile = learner().relearn(&[]);
        assert!(profile.interest_keywords.is_empty());
        assert!(profile.category_weights.is_empty());
        assert_eq!(profile.total_feedback_count, 0);
    }

    #[test]
    fn test_tracker_fires_every_nth_event() {
        let mut tracker = FeedbackTracker::new(3);
        let user = Uuid::new_v4();

        assert!(!tracker.record(user));
        assert!(!tracker.record(user));
        assert!(tracker.record(user));
        assert!(!tracker.record(user));
    }

    #[test]
    fn test_tracker_is_per_user() {
        let mut tracker = FeedbackTracker::new(2);
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        assert!(!tracker.record(alice));
        // Bob's first event must not ride on Alice's count
        assert!(!tracker.record(bob));
        assert!(tracker.record(alice));
        assert!(tracker.record(bob));
    }
}
