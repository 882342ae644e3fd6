//! Signal calculators: one score each, no shared state.

pub mod depth;
pub mod personalization;
pub mod serendipity;
pub mod trend;

pub use depth::classify_content_depth;
pub use personalization::personalization_score;
pub use serendipity::serendipity_score;
pub use trend::trend_score;
