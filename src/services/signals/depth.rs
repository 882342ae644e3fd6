//! Content-depth classification: length heuristic first, gateway fallback
//! for the ambiguous middle band.

use crate::models::{Article, ContentDepth};
use crate::services::gateway::AiGateway;
use tracing::warn;

/// Descriptions shorter than this are clearly light reads
const LIGHT_MAX_CHARS: usize = 500;
/// Descriptions longer than this are clearly long-form
const HEAVY_MIN_CHARS: usize = 2000;
/// Snippet sent to the gateway for the ambiguous band
const CLASSIFY_SNIPPET_CHARS: usize = 500;

/// Classify an article's depth.
///
/// The length heuristic short-circuits the clear-cut cases so only the
/// ambiguous middle band costs a remote call. Any gateway failure or
/// off-script reply degrades to Medium.
pub async fn classify_content_depth(article: &Article, gateway: &dyn AiGateway) -> ContentDepth {
    let len = article.description.chars().count();

    if len < LIGHT_MAX_CHARS {
        return ContentDepth::Light;
    }
    if len > HEAVY_MIN_CHARS {
        return ContentDepth::Heavy;
    }

    let snippet: String = article
        .description
        .chars()
        .take(CLASSIFY_SNIPPET_CHARS)
        .collect();

    match gateway.classify_depth(&article.title, &snippet).await {
        Ok(Some(depth)) => depth,
        Ok(None) => ContentDepth::Medium,
        Err(e) => {
            warn!(article_id = %article.id, error = %e, "depth classification degraded to medium");
            ContentDepth::Medium
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::gateway::{GatewayError, MockAiGateway};

    fn article_with_description(len: usize) -> Article {
        Article::new("Title", "x".repeat(len), "https://example.com/a")
    }

    #[tokio::test]
    async fn test_short_description_is_light() {
        let gateway = MockAiGateway::new(); // must not be called
        let article = article_with_description(300);
        assert_eq!(
            classify_content_depth(&article, &gateway).await,
            ContentDepth::Light
        );
    }

    #[tokio::test]
    async fn test_long_description_is_heavy() {
        let gateway = MockAiGateway::new();
        let article = article_with_description(2500);
        assert_eq!(
            classify_content_depth(&article, &gateway).await,
            ContentDepth::Heavy
        );
    }

    #[tokio::test]
    async fn test_middle_band_uses_gateway() {
        let mut gateway = MockAiGateway::new();
        gateway
            .expect_classify_depth()
            .times(1)
            .returning(|_, _| Ok(Some(ContentDepth::Heavy)));

        let article = article_with_description(1000);
        assert_eq!(
            classify_content_depth(&article, &gateway).await,
            ContentDepth::Heavy
        );
    }

    #[tokio::test]
    async fn test_gateway_failure_defaults_to_medium() {
        let mut gateway = MockAiGateway::new();
        gateway
            .expect_classify_depth()
            .returning(|_, _| Err(GatewayError::Status(503)));

        let article = article_with_description(1000);
        assert_eq!(
            classify_content_depth(&article, &gateway).await,
            ContentDepth::Medium
        );
    }

    #[tokio::test]
    async fn test_off_script_reply_defaults_to_medium() {
        let mut gateway = MockAiGateway::new();
        gateway.expect_classify_depth().returning(|_, _| Ok(None));

        let article = article_with_description(1000);
        assert_eq!(
            classify_content_depth(&article, &gateway).await,
            ContentDepth::Medium
        );
    }
}
