//! Article persistence seam. The engine only needs stage-filtered batch
//! reads and single-article writes; the real persistence layer lives
//! outside this crate, so the in-memory implementation here backs the
//! worker binary and the tests.

use crate::models::Article;
use std::sync::RwLock;
use uuid::Uuid;

/// Stage-oriented access to stored articles. Each read filters on a
/// scoring stage's entry condition, which is what makes re-running a stage
/// a no-op for already-advanced articles.
pub trait ArticleStore: Send + Sync {
    /// Articles lacking a summary whose description is long enough to be
    /// worth summarizing
    fn needing_summary(&self, min_chars: usize, limit: usize) -> Vec<Article>;

    /// Articles the AI has not relevance-scored yet (`relevance_score == 0`)
    fn unscored(&self, limit: usize) -> Vec<Article>;

    /// Articles whose content depth has not been classified
    fn unclassified(&self, limit: usize) -> Vec<Article>;

    /// Relevance-scored articles that have not been personalized
    fn pending_personalization(&self, limit: usize) -> Vec<Article>;

    /// Most recently published articles, for trend sampling
    fn recent(&self, limit: usize) -> Vec<Article>;

    /// Every article carrying non-neutral feedback, for the learner
    fn feedback_history(&self) -> Vec<Article>;

    fn get(&self, id: Uuid) -> Option<Article>;

    /// Write an article's current state back
    fn save(&self, article: &Article);
}

/// In-memory store used by the worker binary and tests.
#[derive(Default)]
pub struct MemoryStore {
    articles: RwLock<Vec<Article>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_articles(articles: Vec<Article>) -> Self {
        Self {
            articles: RwLock::new(articles),
        }
    }

    pub fn insert(&self, article: Article) {
        self.articles.write().expect("store lock poisoned").push(article);
    }

    pub fn all(&self) -> Vec<Article> {
        self.articles.read().expect("store lock poisoned").clone()
    }

    pub fn len(&self) -> usize {
        self.articles.read().expect("store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn filtered<F>(&self, limit: usize, predicate: F) -> Vec<Article>
    where
        F: Fn(&Article) -> bool,
    {
        self.articles
            .read()
            .expect("store lock poisoned")
            .iter()
            .filter(|a| predicate(a))
            .take(limit)
            .cloned()
            .collect()
    }
}

impl ArticleStore for MemoryStore {
    fn needing_summary(&self, min_chars: usize, limit: usize) -> Vec<Article> {
        self.filtered(limit, |a| {
            a.ai_summary.is_none() && a.description.chars().count() > min_chars
        })
    }

    fn unscored(&self, limit: usize) -> Vec<Article> {
        self.filtered(limit, |a| a.relevance_score == 0)
    }

    fn unclassified(&self, limit: usize) -> Vec<Article> {
        self.filtered(limit, |a| a.content_depth.is_none())
    }

    fn pending_personalization(&self, limit: usize) -> Vec<Article> {
        self.filtered(limit, |a| {
            a.relevance_score > 0 && a.personalization_score == 0.0
        })
    }

    fn recent(&self, limit: usize) -> Vec<Article> {
        let mut articles = self.all();
        articles.sort_by(|a, b| b.pub_date.cmp(&a.pub_date));
        articles.truncate(limit);
        articles
    }

    fn feedback_history(&self) -> Vec<Article> {
        self.articles
            .read()
            .expect("store lock poisoned")
            .iter()
            .filter(|a| a.has_feedback())
            .cloned()
            .collect()
    }

    fn get(&self, id: Uuid) -> Option<Article> {
        self.articles
            .read()
            .expect("store lock poisoned")
            .iter()
            .find(|a| a.id == id)
            .cloned()
    }

    fn save(&self, article: &Article) {
        let mut articles = self.articles.write().expect("store lock poisoned");
        match articles.iter_mut().find(|a| a.id == article.id) {
            Some(slot) => *slot = article.clone(),
            None => articles.push(article.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn article(relevance: i64, personalization: f64) -> Article {
        let mut a = Article::new("title words here", "d", "https://e.com/a");
        a.relevance_score = relevance;
        a.personalization_score = personalization;
        a
    }

    #[test]
    fn test_stage_filters() {
        let store = MemoryStore::new();
        store.insert(article(0, 0.0)); // unscored
        store.insert(article(70, 0.0)); // pending personalization
        store.insert(article(70, 55.0)); // fully scored

        assert_eq!(store.unscored(10).len(), 1);
        assert_eq!(store.pending_personalization(10).len(), 1);
        assert_eq!(store.unclassified(10).len(), 3);
    }

    #[test]
    fn test_limits_respected() {
        let store = MemoryStore::new();
        for _ in 0..10 {
            store.insert(article(0, 0.0));
        }
        assert_eq!(store.unscored(4).len(), 4);
    }

    #[test]
    fn test_needing_summary_threshold() {
        let store = MemoryStore::new();
        let short = Article::new("t", "x".repeat(100), "https://e.com/1");
        let long = Article::new("t", "x".repeat(800), "https://e.com/2");
        let mut summarized = Article::new("t", "x".repeat(800), "https://e.com/3");
        summarized.ai_summary = Some("done".to_string());

        store.insert(short);
        store.insert(long.clone());
        store.insert(summarized);

        let pending = store.needing_summary(500, 10);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, long.id);
    }

    #[test]
    fn test_recent_sorted_by_pub_date() {
        let store = MemoryStore::new();
        let mut old = article(0, 0.0);
        old.pub_date = Utc::now() - Duration::days(5);
        let newer = article(0, 0.0);

        store.insert(old.clone());
        store.insert(newer.clone());

        let recent = store.recent(10);
        assert_eq!(recent[0].id, newer.id);
        assert_eq!(recent[1].id, old.id);
    }

    #[test]
    fn test_save_updates_in_place() {
        let store = MemoryStore::new();
        let mut a = article(0, 0.0);
        store.insert(a.clone());

        a.relevance_score = 88;
        store.save(&a);

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(a.id).unwrap().relevance_score, 88);
    }
}
