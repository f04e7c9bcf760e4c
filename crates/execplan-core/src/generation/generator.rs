//! The generation contract seen by the planning service.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use super::client::{ChatCompletion, TEMPERATURE};
use super::error::GenerationError;
use super::models::resolve_model_id;
use super::parse::parse_titles;
use super::prompt::{ListKind, build_prompt};

/// Produces task and subtask titles for free-text input.
///
/// Implementations never fail: any problem is logged and reported as an
/// empty list, which callers treat as "nothing generated".
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate_tasks(&self, goal_text: &str, model_selector: &str) -> Vec<String>;

    async fn generate_subtasks(&self, task_title: &str, model_selector: &str) -> Vec<String>;
}

const _: () = {
    fn _assert_object_safe(_: &dyn Generator) {}
};

/// [`Generator`] backed by a language model.
#[derive(Clone)]
pub struct LlmGenerator {
    backend: Arc<dyn ChatCompletion>,
}

impl LlmGenerator {
    pub fn new(backend: Arc<dyn ChatCompletion>) -> Self {
        Self { backend }
    }

    async fn try_generate(
        &self,
        kind: ListKind,
        text: &str,
        model_id: &str,
    ) -> Result<Vec<String>, GenerationError> {
        let prompt = build_prompt(kind, text);
        let reply = self.backend.complete(model_id, &prompt, TEMPERATURE).await?;
        parse_titles(&reply, kind)
    }

    async fn generate(&self, kind: ListKind, text: &str, model_selector: &str) -> Vec<String> {
        let model_id = resolve_model_id(model_selector);
        match self.try_generate(kind, text, model_id).await {
            Ok(titles) => {
                info!(
                    kind = kind.json_key(),
                    model = model_id,
                    count = titles.len(),
                    "generated titles"
                );
                titles
            }
            Err(e) => {
                warn!(
                    kind = kind.json_key(),
                    model = model_id,
                    error = %e,
                    "generation failed, continuing with no items"
                );
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl Generator for LlmGenerator {
    async fn generate_tasks(&self, goal_text: &str, model_selector: &str) -> Vec<String> {
        self.generate(ListKind::Tasks, goal_text, model_selector).await
    }

    async fn generate_subtasks(&self, task_title: &str, model_selector: &str) -> Vec<String> {
        self.generate(ListKind::Subtasks, task_title, model_selector)
            .await
    }
}
