//! AI gateway: the remote language model the scoring engine leans on for
//! summaries, batch relevance scores, and depth classification. Treated as
//! an unreliable, rate-limited oracle: every caller has a documented
//! default to fall back to when a call fails.

pub mod gemini;
pub mod throttle;

pub use gemini::GeminiGateway;
pub use throttle::{with_retry, RetryConfig, Throttle};

use crate::models::ContentDepth;
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("gateway returned malformed payload: {0}")]
    MalformedResponse(String),
    #[error("gateway returned status {0}")]
    Status(u16),
}

pub type Result<T> = std::result::Result<T, GatewayError>;

/// One article in a batch relevance-scoring request
#[derive(Debug, Clone)]
pub struct RelevanceCandidate {
    pub id: Uuid,
    pub title: String,
    /// Description truncated to a short snippet by the caller
    pub snippet: String,
    pub category: String,
}

/// Contract with the remote model. All three operations may fail or return
/// nothing; callers degrade rather than propagate.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AiGateway: Send + Sync {
    /// Summarize article text. `None` when the text is too short to bother
    /// or the model produced nothing usable.
    async fn summarize(&self, text: &str) -> Result<Option<String>>;

    /// Score a batch of candidates 0-100 against an interest-profile
    /// description, returning a strict id -> score mapping.
    async fn score_batch(
        &self,
        candidates: &[RelevanceCandidate],
        profile: &str,
    ) -> Result<HashMap<Uuid, i64>>;

    /// Classify content depth from title and snippet. `None` when the model
    /// replied with anything other than one of the three depth tokens.
    async fn classify_depth(&self, title: &str, snippet: &str) -> Result<Option<ContentDepth>>;
}
