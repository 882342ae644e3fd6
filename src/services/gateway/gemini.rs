//! Gemini REST provider for the [`AiGateway`] contract.

use super::{AiGateway, GatewayError, RelevanceCandidate, Result};
use crate::config::GatewayConfig;
use crate::models::ContentDepth;
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};
use uuid::Uuid;

/// Texts shorter than this are not worth a summarization call
const SUMMARIZE_MIN_CHARS: usize = 300;
/// Article text is truncated before being sent to the model
const SUMMARIZE_MAX_CHARS: usize = 10_000;
/// Description snippet length in batch-scoring prompts
const SNIPPET_CHARS: usize = 200;

pub struct GeminiGateway {
    client: HttpClient,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiGateway {
    pub fn new(config: &GatewayConfig) -> Self {
        let client = HttpClient::builder()
            .timeout(config.request_timeout())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: config.api_base_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    async fn generate(&self, prompt: &str, json_response: bool) -> Result<String> {
        let generation_config = json_response.then(|| GenerationConfig {
            response_mime_type: "application/json".to_string(),
        });

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config,
        };

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(GatewayError::Status(response.status().as_u16()));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;

        body.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| GatewayError::MalformedResponse("empty candidate list".to_string()))
    }
}

#[async_trait]
impl AiGateway for GeminiGateway {
    async fn summarize(&self, text: &str) -> Result<Option<String>> {
        if text.chars().count() < SUMMARIZE_MIN_CHARS {
            return Ok(None);
        }

        let truncated: String = text.chars().take(SUMMARIZE_MAX_CHARS).collect();
        let prompt = format!(
            "Summarize the following news article in 3-4 bullet points. \
             Keep it concise:\n\n{truncated}"
        );

        let summary = self.generate(&prompt, false).await?;
        debug!(chars = summary.len(), "article summarized");
        Ok(Some(summary))
    }

    async fn score_batch(
        &self,
        candidates: &[RelevanceCandidate],
        profile: &str,
    ) -> Result<HashMap<Uuid, i64>> {
        if candidates.is_empty() {
            return Ok(HashMap::new());
        }

        let mut listing = String::new();
        for c in candidates {
            let snippet: String = c.snippet.chars().take(SNIPPET_CHARS).collect();
            listing.push_str(&format!(
                "ID: {}\nTitle: {}\nCategory: {}\nSnippet: {}\n---\n",
                c.id, c.title, c.category, snippet
            ));
        }

        let prompt = format!(
            "You are a personal news curator. Rate the following articles on a \
             scale of 0-100 based on how interesting they likely are to {profile}.\n\n\
             Return ONLY a JSON object mapping IDs to scores. \
             Example: {{\"id-1\": 80, \"id-2\": 20}}\n\nArticles:\n{listing}"
        );

        let text = self.generate(&prompt, true).await?;

        let raw: HashMap<String, i64> = serde_json::from_str(&text)
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;

        let mut scores = HashMap::with_capacity(raw.len());
        for (id, score) in raw {
            match id.parse::<Uuid>() {
                Ok(uuid) => {
                    scores.insert(uuid, score.clamp(0, 100));
                }
                Err(_) => warn!(id = %id, "gateway returned unknown article id"),
            }
        }

        debug!(scored = scores.len(), requested = candidates.len(), "batch scored");
        Ok(scores)
    }

    async fn classify_depth(&self, title: &str, snippet: &str) -> Result<Option<ContentDepth>> {
        let prompt = format!(
            "Classify the depth of this article as exactly one word: \
             'light', 'medium', or 'heavy'.\n\
             light = quick news bite, medium = standard article, \
             heavy = long-form analysis.\n\n\
             Title: {title}\nSnippet: {snippet}\n\nAnswer with one word only."
        );

        let reply = self.generate(&prompt, false).await?;
        Ok(ContentDepth::parse(&reply))
    }
}

// Gemini generateContent wire format

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

#[derive(Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}
