pub mod config;
pub mod models;
pub mod services;
pub mod store;

pub use config::Config;
pub use models::{Article, Category, ContentDepth, Feedback, Source, SourceType};
pub use services::{
    AiGateway, CompositeScorer, ContextRegistry, ContextWeights, CurationPipeline,
    CurationReport, GeminiGateway, PreferenceLearner, ReadingContext, UserPreferences,
};
pub use store::{ArticleStore, MemoryStore};
