//! Composite scorer: combines the four signals and the active reading
//! context's weights into one final ranking score per article.

use crate::models::{clamp_score, Article};
use crate::services::context::{ContextWeights, ReadingContext};
use crate::services::gateway::{AiGateway, RelevanceCandidate};
use crate::services::preferences::UserPreferences;
use crate::services::signals::{
    classify_content_depth, personalization_score, serendipity_score, trend_score,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Relevance applied to articles the gateway failed to score
pub const DEFAULT_RELEVANCE: i64 = 50;
/// How many interest keywords describe the user in the scoring prompt
const PROFILE_KEYWORD_COUNT: usize = 10;
/// Interest description used before any preferences have been learned
const GENERIC_PROFILE: &str =
    "a tech-savvy reader interested in AI, world news, and technology";

pub struct CompositeScorer {
    gateway: Arc<dyn AiGateway>,
}

impl CompositeScorer {
    pub fn new(gateway: Arc<dyn AiGateway>) -> Self {
        Self { gateway }
    }

    /// Request AI relevance scores for a whole batch in one call.
    ///
    /// Any transport or parsing failure degrades to an empty mapping;
    /// callers treat missing ids as unscored and fall back to
    /// [`DEFAULT_RELEVANCE`] instead of failing the batch.
    pub async fn score_relevance_batch(
        &self,
        articles: &[Article],
        preferences: Option<&UserPreferences>,
    ) -> HashMap<Uuid, i64> {
        if articles.is_empty() {
            return HashMap::new();
        }

        let profile = interest_profile(preferences);
        let candidates: Vec<RelevanceCandidate> = articles
            .iter()
            .map(|a| RelevanceCandidate {
                id: a.id,
                title: a.title.clone(),
                snippet: a.description.clone(),
                category: a
                    .category_slug
                    .clone()
                    .unwrap_or_else(|| "general".to_string()),
            })
            .collect();

        match self.gateway.score_batch(&candidates, &profile).await {
            Ok(scores) => {
                debug!(
                    requested = articles.len(),
                    scored = scores.len(),
                    "relevance batch scored"
                );
                scores
            }
            Err(e) => {
                warn!(error = %e, batch = articles.len(), "relevance scoring degraded to empty");
                HashMap::new()
            }
        }
    }

    /// Compute every derived signal for one article and the final weighted
    /// score under the given reading context (or the fixed defaults).
    ///
    /// Writes the signal scores and the final score onto the article but
    /// does not persist it; storage is the caller's responsibility.
    pub async fn score_article_comprehensive(
        &self,
        article: &mut Article,
        preferences: Option<&UserPreferences>,
        context: Option<&ReadingContext>,
        recent_articles: &[Article],
    ) -> f64 {
        article.personalization_score = personalization_score(article, preferences);
        article.trend_score = trend_score(article, recent_articles);
        article.serendipity_score = serendipity_score(article, preferences);

        if article.content_depth.is_none() {
            article.content_depth =
                Some(classify_content_depth(article, self.gateway.as_ref()).await);
        }

        let weights = context.map(|c| c.weights).unwrap_or_default();
        let final_score = combine(article, &weights);
        article.final_score = final_score;

        debug!(
            article_id = %article.id,
            personalization = article.personalization_score,
            trend = article.trend_score,
            serendipity = article.serendipity_score,
            relevance = article.relevance_score,
            final_score,
            "article scored"
        );

        final_score
    }
}

fn combine(article: &Article, weights: &ContextWeights) -> f64 {
    clamp_score(
        article.relevance_score as f64 * weights.relevance
            + article.personalization_score * weights.personalization
            + article.serendipity_score * weights.serendipity
            + article.trend_score * weights.trend,
    )
}

/// Interest-profile description for scoring prompts: the user's top
/// keywords, or the generic fallback before anything has been learned.
fn interest_profile(preferences: Option<&UserPreferences>) -> String {
    match preferences {
        Some(prefs) if !prefs.interest_keywords.is_empty() => {
            let keywords: Vec<&str> = prefs
                .interest_keywords
                .iter()
                .take(PROFILE_KEYWORD_COUNT)
                .map(|s| s.as_str())
                .collect();
            format!("a reader whose interests include: {}", keywords.join(", "))
        }
        _ => GENERIC_PROFILE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContentDepth;
    use crate::services::context::ContextWeights;
    use crate::services::gateway::{GatewayError, MockAiGateway};

    fn scorer_with(gateway: MockAiGateway) -> CompositeScorer {
        CompositeScorer::new(Arc::new(gateway))
    }

    fn scored_article() -> Article {
        let mut article = Article::new("Quantum computing advances", "short", "https://e.com/a");
        article.relevance_score = 80;
        article.content_depth = Some(ContentDepth::Medium);
        article
    }

    #[test]
    fn test_weighted_combination() {
        let mut article = scored_article();
        article.personalization_score = 70.0;
        article.trend_score = 60.0;
        article.serendipity_score = 40.0;

        let weights = ContextWeights::new(0.4, 0.3, 0.1, 0.2);
        let final_score = combine(&article, &weights);
        // 80*0.4 + 70*0.3 + 40*0.1 + 60*0.2 = 32 + 21 + 4 + 12 = 69
        assert!((final_score - 69.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_comprehensive_writes_signals_and_final() {
        let scorer = scorer_with(MockAiGateway::new());
        let mut article = scored_article();

        let final_score = scorer
            .score_article_comprehensive(&mut article, None, None, &[])
            .await;

        // No preferences and no recent sample: both signals neutral
        assert_eq!(article.personalization_score, 50.0);
        assert_eq!(article.trend_score, 50.0);
        assert_eq!(article.serendipity_score, 50.0);
        // 80*0.4 + 50*0.3 + 50*0.1 + 50*0.2 = 62
        assert!((final_score - 62.0).abs() < 1e-9);
        assert_eq!(article.final_score, final_score);
    }

    #[tokio::test]
    async fn test_comprehensive_classifies_unset_depth() {
        let mut gateway = MockAiGateway::new();
        gateway
            .expect_classify_depth()
            .times(1)
            .returning(|_, _| Ok(Some(ContentDepth::Heavy)));
        let scorer = scorer_with(gateway);

        let mut article = Article::new("Title", "y".repeat(1000), "https://e.com/a");
        article.relevance_score = 50;
        article.content_depth = None;

        scorer
            .score_article_comprehensive(&mut article, None, None, &[])
            .await;
        assert_eq!(article.content_depth, Some(ContentDepth::Heavy));
    }

    #[tokio::test]
    async fn test_comprehensive_keeps_existing_depth() {
        // classify_depth must not be called when depth is already set
        let scorer = scorer_with(MockAiGateway::new());
        let mut article = scored_article();

        scorer
            .score_article_comprehensive(&mut article, None, None, &[])
            .await;
        assert_eq!(article.content_depth, Some(ContentDepth::Medium));
    }

    #[tokio::test]
    async fn test_batch_failure_degrades_to_empty() {
        let mut gateway = MockAiGateway::new();
        gateway
            .expect_score_batch()
            .returning(|_, _| Err(GatewayError::Status(429)));
        let scorer = scorer_with(gateway);

        let articles = vec![scored_article(), scored_article()];
        let scores = scorer.score_relevance_batch(&articles, None).await;
        assert!(scores.is_empty());
    }

    #[tokio::test]
    async fn test_batch_uses_keyword_profile() {
        let mut prefs = UserPreferences::default();
        prefs.interest_keywords = vec!["quantum".to_string(), "rust".to_string()];

        let mut gateway = MockAiGateway::new();
        gateway
            .expect_score_batch()
            .withf(|_, profile| profile.contains("quantum") && profile.contains("rust"))
            .returning(|candidates, _| {
                Ok(candidates.iter().map(|c| (c.id, 75)).collect())
            });
        let scorer = scorer_with(gateway);

        let articles = vec![scored_article()];
        let scores = scorer.score_relevance_batch(&articles, Some(&prefs)).await;
        assert_eq!(scores[&articles[0].id], 75);
    }

    #[test]
    fn test_generic_profile_without_preferences() {
        assert_eq!(interest_profile(None), GENERIC_PROFILE);
        let empty = UserPreferences::default();
        assert_eq!(interest_profile(Some(&empty)), GENERIC_PROFILE);
    }
}
