//! Assembles a [`PlanningService`] from resolved configuration.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::warn;

use execplan_core::generation::OpenAiCompatClient;
use execplan_core::{Generator, LlmGenerator, PlanningService};

use crate::config::ExecplanConfig;

/// Stand-in for commands that never generate. Reports nothing generated.
struct NoGenerator;

#[async_trait]
impl Generator for NoGenerator {
    async fn generate_tasks(&self, _goal_text: &str, _model_selector: &str) -> Vec<String> {
        warn!("no API key configured, skipping task generation");
        Vec::new()
    }

    async fn generate_subtasks(&self, _task_title: &str, _model_selector: &str) -> Vec<String> {
        warn!("no API key configured, skipping subtask generation");
        Vec::new()
    }
}

/// Service for commands that call the generation endpoint. Fails without an
/// API key.
pub fn generating_service(config: &ExecplanConfig, pool: PgPool) -> Result<PlanningService> {
    let generation = config.require_generation()?;
    let client =
        OpenAiCompatClient::new(generation).context("failed to build generation client")?;
    let generator = LlmGenerator::new(Arc::new(client));
    Ok(PlanningService::new(pool, Arc::new(generator)))
}

/// Service for commands that only touch storage.
pub fn storage_service(pool: PgPool) -> PlanningService {
    PlanningService::new(pool, Arc::new(NoGenerator))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_generator_reports_nothing() {
        assert!(NoGenerator.generate_tasks("Learn guitar", "Gemma3 12b").await.is_empty());
        assert!(NoGenerator.generate_subtasks("Buy a guitar", "Gemma3 12b").await.is_empty());
    }
}
