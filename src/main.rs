//! Curation worker: reads ingested articles from a JSONL file, runs one
//! full curation pass (summaries, relevance, depth, personalization), and
//! writes the scored articles back out as JSONL. The HTTP surfaces that
//! ingest articles and render the dashboard live outside this service.

use anyhow::Context as _;
use curation_service::services::context::default_contexts;
use curation_service::{
    Article, Config, ContextRegistry, CurationPipeline, GeminiGateway, MemoryStore,
    UserPreferences,
};
use std::io::Write as _;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env();
    info!("Starting {}", config.service.service_name);

    let input_path = std::env::var("ARTICLES_PATH").unwrap_or_else(|_| "articles.jsonl".to_string());
    let output_path =
        std::env::var("SCORED_OUTPUT_PATH").unwrap_or_else(|_| "articles.scored.jsonl".to_string());

    let store = MemoryStore::new();
    let input = std::fs::read_to_string(&input_path)
        .with_context(|| format!("reading articles from {input_path}"))?;
    for (line_no, line) in input.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Article>(line) {
            Ok(article) => store.insert(article),
            Err(e) => warn!(line = line_no + 1, error = %e, "skipping malformed article"),
        }
    }
    info!(articles = store.len(), "articles loaded");

    // Single-user worker: the profile and contexts belong to the operator
    let user_id = std::env::var("CURATION_USER_ID")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or_else(Uuid::new_v4);
    let preferences = UserPreferences::new(user_id);

    let registry = ContextRegistry::new();
    for context in default_contexts(user_id) {
        registry.create(context)?;
    }
    let balanced = registry
        .list(user_id)
        .into_iter()
        .find(|c| c.name == "Balanced")
        .map(|c| c.id);
    if let Some(id) = balanced {
        registry.activate(user_id, id)?;
    }
    let active_context = registry.active(user_id);

    let gateway = Arc::new(GeminiGateway::new(&config.gateway));
    let pipeline = CurationPipeline::new(
        gateway,
        &config.gateway,
        config.curation.clone(),
        config.learner.clone(),
    );

    let report = pipeline
        .run(&store, Some(&preferences), active_context.as_ref())
        .await;
    info!(?report, "curation pass finished");

    let mut out = std::fs::File::create(&output_path)
        .with_context(|| format!("creating {output_path}"))?;
    let mut articles = store.all();
    articles.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for article in &articles {
        serde_json::to_writer(&mut out, article)?;
        out.write_all(b"\n")?;
    }
    info!(articles = articles.len(), path = %output_path, "scored articles written");

    Ok(())
}
