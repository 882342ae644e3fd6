//! The four-stage curation pipeline, the engine's batch entry point:
//! summarize, relevance-score, classify depth, personalize. Each stage
//! selects its batch on the stage's entry condition, so re-running a stage
//! over already-advanced articles is a no-op. Also hosts the feedback entry
//! point that closes the learning loop.

use crate::config::{CurationConfig, GatewayConfig, LearnerConfig};
use crate::models::Feedback;
use crate::services::context::ReadingContext;
use crate::services::gateway::{with_retry, AiGateway, RetryConfig, Throttle};
use crate::services::preferences::{FeedbackTracker, PreferenceLearner, UserPreferences};
use crate::services::scorer::{CompositeScorer, DEFAULT_RELEVANCE};
use crate::services::signals::classify_content_depth;
use crate::store::ArticleStore;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("article {0} not found")]
    ArticleNotFound(Uuid),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// What one curation pass touched
#[derive(Debug, Default, Clone, Copy, serde::Serialize)]
pub struct CurationReport {
    pub summarized: usize,
    pub relevance_scored: usize,
    pub depth_classified: usize,
    pub personalized: usize,
}

pub struct CurationPipeline {
    scorer: CompositeScorer,
    gateway: Arc<dyn AiGateway>,
    summarize_throttle: Throttle,
    retry: RetryConfig,
    config: CurationConfig,
    learner: PreferenceLearner,
    tracker: Mutex<FeedbackTracker>,
}

impl CurationPipeline {
    pub fn new(
        gateway: Arc<dyn AiGateway>,
        gateway_config: &GatewayConfig,
        curation: CurationConfig,
        learner_config: LearnerConfig,
    ) -> Self {
        let retry = RetryConfig {
            max_retries: gateway_config.max_retries,
            ..Default::default()
        };

        Self {
            scorer: CompositeScorer::new(gateway.clone()),
            gateway,
            summarize_throttle: Throttle::new(gateway_config.summarize_interval()),
            retry,
            config: curation,
            learner: PreferenceLearner::new(learner_config.clone()),
            tracker: Mutex::new(FeedbackTracker::new(learner_config.feedback_trigger_interval)),
        }
    }

    /// Run all four stages once against the store.
    pub async fn run(
        &self,
        store: &dyn ArticleStore,
        preferences: Option<&UserPreferences>,
        context: Option<&ReadingContext>,
    ) -> CurationReport {
        let mut report = CurationReport::default();

        report.summarized = self.summarize_stage(store).await;
        report.relevance_scored = self.relevance_stage(store, preferences).await;
        report.depth_classified = self.depth_stage(store).await;
        report.personalized = self.personalize_stage(store, preferences, context).await;

        info!(
            summarized = report.summarized,
            relevance_scored = report.relevance_scored,
            depth_classified = report.depth_classified,
            personalized = report.personalized,
            "curation pass complete"
        );

        report
    }

    /// Stage 1: summarize substantive articles that have no summary yet.
    /// Gateway calls are throttled; a failed article is skipped, not fatal.
    async fn summarize_stage(&self, store: &dyn ArticleStore) -> usize {
        let batch = store.needing_summary(
            self.config.summarize_min_chars,
            self.config.summarize_batch_size,
        );

        let mut summarized = 0;
        for mut article in batch {
            self.summarize_throttle.acquire().await;

            let result = with_retry(&self.retry, || {
                self.gateway.summarize(&article.description)
            })
            .await;

            match result {
                Ok(Some(summary)) => {
                    article.ai_summary = Some(summary);
                    store.save(&article);
                    summarized += 1;
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(article_id = %article.id, error = %e, "summarization skipped");
                }
            }
        }
        summarized
    }

    /// Stage 2: batch AI relevance scoring. Articles the gateway missed
    /// (or the whole batch, on failure) get the default relevance so they
    /// still advance to the next stage.
    async fn relevance_stage(
        &self,
        store: &dyn ArticleStore,
        preferences: Option<&UserPreferences>,
    ) -> usize {
        let batch = store.unscored(self.config.relevance_batch_size);
        if batch.is_empty() {
            return 0;
        }

        let scores = self.scorer.score_relevance_batch(&batch, preferences).await;

        let mut scored = 0;
        for mut article in batch {
            // Floor at 1: relevance > 0 is the stage's exit condition, so a
            // literal 0 from the gateway must not strand the article here
            article.relevance_score = scores
                .get(&article.id)
                .copied()
                .unwrap_or(DEFAULT_RELEVANCE)
                .max(1);
            store.save(&article);
            scored += 1;
        }
        scored
    }

    /// Stage 3: classify content depth for unclassified articles.
    async fn depth_stage(&self, store: &dyn ArticleStore) -> usize {
        let batch = store.unclassified(self.config.depth_batch_size);

        let mut classified = 0;
        for mut article in batch {
            let depth = classify_content_depth(&article, self.gateway.as_ref()).await;
            article.content_depth = Some(depth);
            store.save(&article);
            classified += 1;
        }
        classified
    }

    /// Stage 4: compute personalization, trend, and serendipity signals and
    /// the final weighted score for relevance-scored articles.
    async fn personalize_stage(
        &self,
        store: &dyn ArticleStore,
        preferences: Option<&UserPreferences>,
        context: Option<&ReadingContext>,
    ) -> usize {
        let recent = store.recent(self.config.trend_sample_size);
        let batch = store.pending_personalization(self.config.personalize_batch_size);

        let mut personalized = 0;
        for mut article in batch {
            self.scorer
                .score_article_comprehensive(&mut article, preferences, context, &recent)
                .await;
            store.save(&article);
            personalized += 1;
        }
        personalized
    }

    /// Apply a feedback action to an article (toggle semantics) and relearn
    /// the user's preferences when their feedback count hits the trigger
    /// interval. Unknown actions map to neutral rather than erroring.
    pub fn handle_feedback(
        &self,
        store: &dyn ArticleStore,
        preferences: &mut UserPreferences,
        article_id: Uuid,
        action: &str,
    ) -> Result<Feedback> {
        let mut article = store
            .get(article_id)
            .ok_or(PipelineError::ArticleNotFound(article_id))?;

        let feedback = article.apply_feedback(action);
        store.save(&article);

        let due = self
            .tracker
            .lock()
            .expect("tracker lock poisoned")
            .record(preferences.user_id);

        if due {
            self.relearn(store, preferences);
        }

        Ok(feedback)
    }

    /// Rebuild the user's learned profile from the store's full feedback
    /// history. Also callable on demand.
    pub fn relearn(&self, store: &dyn ArticleStore, preferences: &mut UserPreferences) {
        let history = store.feedback_history();
        let profile = self.learner.relearn(&history);
        preferences.apply(profile);
        info!(
            user_id = %preferences.user_id,
            total_feedback = preferences.total_feedback_count,
            "preferences relearned"
        );
    }
}
