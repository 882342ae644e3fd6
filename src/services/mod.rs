pub mod context;
pub mod gateway;
pub mod pipeline;
pub mod preferences;
pub mod scorer;
pub mod signals;

pub use context::{ContextRegistry, ContextWeights, ReadingContext};
pub use gateway::{AiGateway, GeminiGateway};
pub use pipeline::{CurationPipeline, CurationReport};
pub use preferences::{FeedbackTracker, PreferenceLearner, UserPreferences};
pub use scorer::CompositeScorer;
