use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub gateway: GatewayConfig,
    pub curation: CurationConfig,
    pub learner: LearnerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub service_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    pub api_base_url: String,
    pub api_key: String,
    pub model: String,
    /// Bounded timeout for every gateway call
    pub request_timeout_secs: u64,
    /// Minimum spacing between summarization calls (rate-limit contract)
    pub summarize_interval_secs: u64,
    pub max_retries: u32,
}

impl GatewayConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn summarize_interval(&self) -> Duration {
        Duration::from_secs(self.summarize_interval_secs)
    }
}

/// Batch sizes for the four curation stages plus the trend sample
#[derive(Debug, Clone, Deserialize)]
pub struct CurationConfig {
    pub summarize_batch_size: usize,
    pub relevance_batch_size: usize,
    pub depth_batch_size: usize,
    pub personalize_batch_size: usize,
    pub trend_sample_size: usize,
    /// Descriptions shorter than this are not worth summarizing
    pub summarize_min_chars: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LearnerConfig {
    /// Relearn preferences every Nth feedback event for a user
    pub feedback_trigger_interval: u32,
    /// Liked-article sample size for keyword extraction
    pub keyword_sample_size: usize,
    pub max_keywords: usize,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Config {
            service: ServiceConfig {
                service_name: env::var("SERVICE_NAME")
                    .unwrap_or_else(|_| "curation-service".to_string()),
            },
            gateway: GatewayConfig {
                api_base_url: env::var("GEMINI_API_BASE_URL").unwrap_or_else(|_| {
                    "https://generativelanguage.googleapis.com/v1beta".to_string()
                }),
                api_key: env::var("GEMINI_API_KEY").unwrap_or_default(),
                model: env::var("GEMINI_MODEL")
                    .unwrap_or_else(|_| "gemini-2.0-flash".to_string()),
                request_timeout_secs: env_parse("GATEWAY_TIMEOUT_SECS", 15),
                summarize_interval_secs: env_parse("SUMMARIZE_INTERVAL_SECS", 4),
                max_retries: env_parse("GATEWAY_MAX_RETRIES", 2),
            },
            curation: CurationConfig {
                summarize_batch_size: env_parse("SUMMARIZE_BATCH_SIZE", 20),
                relevance_batch_size: env_parse("RELEVANCE_BATCH_SIZE", 50),
                depth_batch_size: env_parse("DEPTH_BATCH_SIZE", 50),
                personalize_batch_size: env_parse("PERSONALIZE_BATCH_SIZE", 100),
                trend_sample_size: env_parse("TREND_SAMPLE_SIZE", 200),
                summarize_min_chars: env_parse("SUMMARIZE_MIN_CHARS", 500),
            },
            learner: LearnerConfig {
                feedback_trigger_interval: env_parse("FEEDBACK_TRIGGER_INTERVAL", 10),
                keyword_sample_size: env_parse("KEYWORD_SAMPLE_SIZE", 50),
                max_keywords: env_parse("MAX_INTEREST_KEYWORDS", 20),
            },
        }
    }
}

impl Default for CurationConfig {
    fn default() -> Self {
        Self {
            summarize_batch_size: 20,
            relevance_batch_size: 50,
            depth_batch_size: 50,
            personalize_batch_size: 100,
            trend_sample_size: 200,
            summarize_min_chars: 500,
        }
    }
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            feedback_trigger_interval: 10,
            keyword_sample_size: 50,
            max_keywords: 20,
        }
    }
}

fn env_parse<T: std::str::FromStr + Copy>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
