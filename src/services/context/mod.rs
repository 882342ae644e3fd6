//! Reading contexts: named weighting profiles that decide how the four
//! signals combine into one rank. A user has many contexts but at most one
//! active at a time; switching is atomic under the registry's per-user lock.

use crate::models::ContentDepth;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

/// Allowed drift of the weight sum around 1.0
const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("context weights must sum to 1.0 (±{tolerance}), got {sum}")]
    InvalidWeights { sum: f64, tolerance: f64 },
    #[error("context {0} not found")]
    NotFound(Uuid),
}

pub type Result<T> = std::result::Result<T, ContextError>;

/// The four scoring weights, each in [0, 1], summing to ≈1.0
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ContextWeights {
    pub relevance: f64,
    pub personalization: f64,
    pub serendipity: f64,
    pub trend: f64,
}

impl ContextWeights {
    pub fn new(relevance: f64, personalization: f64, serendipity: f64, trend: f64) -> Self {
        Self {
            relevance,
            personalization,
            serendipity,
            trend,
        }
    }

    pub fn sum(&self) -> f64 {
        self.relevance + self.personalization + self.serendipity + self.trend
    }

    pub fn validate(&self) -> Result<()> {
        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ContextError::InvalidWeights {
                sum,
                tolerance: WEIGHT_SUM_TOLERANCE,
            });
        }
        Ok(())
    }
}

impl Default for ContextWeights {
    /// The fixed fallback used when no context is active
    fn default() -> Self {
        Self {
            relevance: 0.4,
            personalization: 0.3,
            serendipity: 0.1,
            trend: 0.2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingContext {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    /// Empty means every category is enabled
    pub enabled_categories: Vec<String>,
    pub depth_filter: Option<ContentDepth>,
    pub weights: ContextWeights,
    pub is_active: bool,
}

impl ReadingContext {
    pub fn new(user_id: Uuid, name: impl Into<String>, weights: ContextWeights) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name: name.into(),
            enabled_categories: Vec::new(),
            depth_filter: None,
            weights,
            is_active: false,
        }
    }
}

/// Per-user registry of reading contexts.
#[derive(Default)]
pub struct ContextRegistry {
    contexts: DashMap<Uuid, Vec<ReadingContext>>,
}

impl ContextRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new context. Weight validation runs before the write;
    /// invalid weight sets never reach the registry.
    pub fn create(&self, context: ReadingContext) -> Result<Uuid> {
        context.weights.validate()?;
        let id = context.id;
        self.contexts
            .entry(context.user_id)
            .or_default()
            .push(context);
        Ok(id)
    }

    /// Replace an existing context's tunable fields, revalidating weights.
    pub fn update(&self, user_id: Uuid, updated: ReadingContext) -> Result<()> {
        updated.weights.validate()?;
        let mut entry = self
            .contexts
            .get_mut(&user_id)
            .ok_or(ContextError::NotFound(updated.id))?;
        let slot = entry
            .iter_mut()
            .find(|c| c.id == updated.id)
            .ok_or(ContextError::NotFound(updated.id))?;
        let was_active = slot.is_active;
        *slot = updated;
        slot.is_active = was_active;
        Ok(())
    }

    /// Activate one context and deactivate all others for the user, in a
    /// single pass under the user's map entry lock.
    pub fn activate(&self, user_id: Uuid, context_id: Uuid) -> Result<()> {
        let mut entry = self
            .contexts
            .get_mut(&user_id)
            .ok_or(ContextError::NotFound(context_id))?;

        if !entry.iter().any(|c| c.id == context_id) {
            return Err(ContextError::NotFound(context_id));
        }

        for context in entry.iter_mut() {
            context.is_active = context.id == context_id;
        }

        info!(user_id = %user_id, context_id = %context_id, "reading context switched");
        Ok(())
    }

    /// The user's active context, if any
    pub fn active(&self, user_id: Uuid) -> Option<ReadingContext> {
        self.contexts
            .get(&user_id)
            .and_then(|list| list.iter().find(|c| c.is_active).cloned())
    }

    pub fn list(&self, user_id: Uuid) -> Vec<ReadingContext> {
        self.contexts
            .get(&user_id)
            .map(|list| list.value().clone())
            .unwrap_or_default()
    }

    /// Seed the standard context presets for a new user, with "Balanced"
    /// active. No-op if the user already has contexts.
    pub fn seed_defaults(&self, user_id: Uuid) -> Result<()> {
        if self.contexts.get(&user_id).is_some_and(|l| !l.is_empty()) {
            return Ok(());
        }

        let presets = default_contexts(user_id);
        let balanced = presets
            .iter()
            .find(|c| c.name == "Balanced")
            .map(|c| c.id)
            .unwrap_or(presets[0].id);

        for context in presets {
            self.create(context)?;
        }
        self.activate(user_id, balanced)
    }
}

/// The five standard presets.
pub fn default_contexts(user_id: Uuid) -> Vec<ReadingContext> {
    let mut morning = ReadingContext::new(
        user_id,
        "Morning Briefing",
        ContextWeights::new(0.5, 0.3, 0.05, 0.15),
    );
    morning.depth_filter = Some(ContentDepth::Light);

    let mut deep_dive = ReadingContext::new(
        user_id,
        "Deep Dive",
        ContextWeights::new(0.4, 0.4, 0.1, 0.1),
    );
    deep_dive.depth_filter = Some(ContentDepth::Heavy);

    let mut balanced = ReadingContext::new(
        user_id,
        "Balanced",
        ContextWeights::new(0.4, 0.3, 0.1, 0.2),
    );
    balanced.depth_filter = Some(ContentDepth::Medium);

    let mut discovery = ReadingContext::new(
        user_id,
        "Discovery Mode",
        ContextWeights::new(0.2, 0.2, 0.4, 0.2),
    );
    discovery.depth_filter = Some(ContentDepth::Medium);

    let mut trending = ReadingContext::new(
        user_id,
        "Trending Topics",
        ContextWeights::new(0.3, 0.15, 0.05, 0.5),
    );
    trending.depth_filter = Some(ContentDepth::Light);

    vec![morning, deep_dive, balanced, discovery, trending]
}
