use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Coarse classification of article length/complexity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContentDepth {
    Light,
    Medium,
    Heavy,
}

impl ContentDepth {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentDepth::Light => "light",
            ContentDepth::Medium => "medium",
            ContentDepth::Heavy => "heavy",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "light" => Some(ContentDepth::Light),
            "medium" => Some(ContentDepth::Medium),
            "heavy" => Some(ContentDepth::Heavy),
            _ => None,
        }
    }

    /// True when the two depths are opposite extremes (light vs heavy)
    pub fn is_opposite(&self, other: ContentDepth) -> bool {
        matches!(
            (self, other),
            (ContentDepth::Light, ContentDepth::Heavy)
                | (ContentDepth::Heavy, ContentDepth::Light)
        )
    }
}

impl Default for ContentDepth {
    fn default() -> Self {
        ContentDepth::Medium
    }
}

/// Tri-state user feedback on an article
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Feedback {
    Like,
    #[default]
    Neutral,
    Dislike,
}

impl Feedback {
    /// Map a UI action string to a feedback value. Unknown actions are
    /// treated as neutral rather than rejected.
    pub fn from_action(action: &str) -> Self {
        match action {
            "like" => Feedback::Like,
            "dislike" => Feedback::Dislike,
            _ => Feedback::Neutral,
        }
    }

    pub fn as_score(&self) -> i8 {
        match self {
            Feedback::Like => 1,
            Feedback::Neutral => 0,
            Feedback::Dislike => -1,
        }
    }

    /// Toggle semantics: applying the currently-set value resets to neutral,
    /// anything else flips directly.
    pub fn toggled(self, action: Feedback) -> Feedback {
        if self == action {
            Feedback::Neutral
        } else {
            action
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Rss,
    Video,
    Podcast,
}

impl Default for SourceType {
    fn default() -> Self {
        SourceType::Rss
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    pub id: Uuid,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub source_type: SourceType,
    pub category_slug: String,
    pub icon_url: Option<String>,
}

/// A scored article. Ingestion creates these with `relevance_score = 0` and
/// all derived scores at 0; the curation pipeline advances them through
/// relevance scoring, depth classification, and personalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub link: String,
    #[serde(default)]
    pub guid: Option<String>,
    pub pub_date: DateTime<Utc>,
    #[serde(default)]
    pub category_slug: Option<String>,
    #[serde(default)]
    pub source_id: Option<Uuid>,
    #[serde(default)]
    pub image_url: Option<String>,

    // AI-derived content
    #[serde(default)]
    pub ai_summary: Option<String>,
    /// None until the depth stage has classified the article
    #[serde(default)]
    pub content_depth: Option<ContentDepth>,

    // Scores, all in [0, 100]
    #[serde(default)]
    pub relevance_score: i64,
    #[serde(default)]
    pub personalization_score: f64,
    #[serde(default)]
    pub trend_score: f64,
    #[serde(default)]
    pub serendipity_score: f64,
    #[serde(default)]
    pub final_score: f64,

    // User state
    #[serde(default)]
    pub feedback: Feedback,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub is_saved: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Article {
    /// A freshly ingested article, before any scoring has run
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        link: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: description.into(),
            link: link.into(),
            guid: None,
            pub_date: Utc::now(),
            category_slug: None,
            source_id: None,
            image_url: None,
            ai_summary: None,
            content_depth: None,
            relevance_score: 0,
            personalization_score: 0.0,
            trend_score: 0.0,
            serendipity_score: 0.0,
            final_score: 0.0,
            feedback: Feedback::Neutral,
            is_read: false,
            is_saved: false,
            created_at: Utc::now(),
        }
    }

    /// Apply a feedback action with toggle semantics, returning the new state
    pub fn apply_feedback(&mut self, action: &str) -> Feedback {
        self.feedback = self.feedback.toggled(Feedback::from_action(action));
        self.feedback
    }

    pub fn has_feedback(&self) -> bool {
        self.feedback != Feedback::Neutral
    }
}

/// Clamp a score into the canonical [0, 100] range
pub fn clamp_score(score: f64) -> f64 {
    score.clamp(0.0, 100.0)
}
