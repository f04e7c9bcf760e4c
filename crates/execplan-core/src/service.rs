//! Planning service layer.
//!
//! Each operation is a short, fixed sequence over the persistence layer,
//! with one call into the [`Generator`] where titles are needed. Generation
//! is best-effort: an empty result is persisted as "no children", never
//! reported as an error.

use std::sync::Arc;

use sqlx::PgPool;
use thiserror::Error;
use tracing::info;

use execplan_db::models::{GoalWithTasks, SubTask, Task};
use execplan_db::queries::tasks::CompletionOutcome;
use execplan_db::queries::{goals as goal_db, subtasks as subtask_db, tasks as task_db};

use crate::generation::{DEFAULT_MODEL_SELECTOR, Generator};

/// Errors surfaced by [`PlanningService`] operations.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("task {0} is already completed")]
    AlreadyCompleted(i64),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl PlanError {
    fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }
}

/// Effort record submitted when completing a task.
#[derive(Debug, Clone, Default)]
pub struct TaskCompletion {
    /// Minutes spent. Must be non-negative.
    pub time_spent: i64,
    pub problems: Option<String>,
    pub insights: Option<String>,
}

/// Outcome of [`PlanningService::generate_subtasks`].
#[derive(Debug, Clone)]
pub enum SubtaskGeneration {
    /// Subtasks were generated and stored (possibly none).
    Generated(Vec<SubTask>),
    /// The task already had this many subtasks; nothing was generated.
    AlreadyPresent(i64),
}

/// Orchestrates goal, task and subtask operations.
#[derive(Clone)]
pub struct PlanningService {
    pool: PgPool,
    generator: Arc<dyn Generator>,
}

impl PlanningService {
    pub fn new(pool: PgPool, generator: Arc<dyn Generator>) -> Self {
        Self { pool, generator }
    }

    /// Persist a goal, ask the generator for its tasks, and persist those in
    /// the order returned.
    ///
    /// `model_selector` defaults to [`DEFAULT_MODEL_SELECTOR`].
    pub async fn create_goal(
        &self,
        title: &str,
        model_selector: Option<&str>,
    ) -> Result<GoalWithTasks, PlanError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(PlanError::Validation("goal title must not be empty".into()));
        }
        let selector = model_selector.unwrap_or(DEFAULT_MODEL_SELECTOR);

        let goal = goal_db::insert_goal(&self.pool, title).await?;
        let titles = self.generator.generate_tasks(title, selector).await;
        task_db::insert_tasks(&self.pool, goal.id, &titles).await?;

        info!(goal_id = goal.id, tasks = titles.len(), model = selector, "goal created");

        goal_db::get_goal_tree(&self.pool, goal.id)
            .await?
            .ok_or_else(|| PlanError::not_found("goal", goal.id))
    }

    /// All goals with their tasks and subtasks, in insertion order.
    pub async fn list_goals(&self) -> Result<Vec<GoalWithTasks>, PlanError> {
        Ok(goal_db::list_goal_trees(&self.pool).await?)
    }

    /// One goal with its tasks and subtasks.
    pub async fn get_goal(&self, goal_id: i64) -> Result<GoalWithTasks, PlanError> {
        goal_db::get_goal_tree(&self.pool, goal_id)
            .await?
            .ok_or_else(|| PlanError::not_found("goal", goal_id))
    }

    /// Delete a goal and everything it owns.
    pub async fn delete_goal(&self, goal_id: i64) -> Result<(), PlanError> {
        if !goal_db::delete_goal(&self.pool, goal_id).await? {
            return Err(PlanError::not_found("goal", goal_id));
        }
        info!(goal_id, "goal deleted");
        Ok(())
    }

    /// Generate and store subtasks for a task that has none yet.
    ///
    /// A task that already has subtasks is left untouched and
    /// [`SubtaskGeneration::AlreadyPresent`] is returned.
    pub async fn generate_subtasks(
        &self,
        task_id: i64,
        model_selector: Option<&str>,
    ) -> Result<SubtaskGeneration, PlanError> {
        let task = task_db::get_task(&self.pool, task_id)
            .await?
            .ok_or_else(|| PlanError::not_found("task", task_id))?;

        let existing = subtask_db::count_subtasks(&self.pool, task_id).await?;
        if existing > 0 {
            info!(task_id, existing, "subtasks already present, skipping generation");
            return Ok(SubtaskGeneration::AlreadyPresent(existing));
        }

        let selector = model_selector.unwrap_or(DEFAULT_MODEL_SELECTOR);
        let titles = self.generator.generate_subtasks(&task.title, selector).await;
        let inserted = subtask_db::insert_subtasks(&self.pool, task_id, &titles).await?;

        info!(task_id, subtasks = inserted.len(), "subtasks generated");
        Ok(SubtaskGeneration::Generated(inserted))
    }

    /// Set a subtask's completion flag.
    pub async fn toggle_subtask(&self, subtask_id: i64, is_completed: bool) -> Result<(), PlanError> {
        if !subtask_db::set_subtask_completed(&self.pool, subtask_id, is_completed).await? {
            return Err(PlanError::not_found("subtask", subtask_id));
        }
        Ok(())
    }

    /// Move a task from `pending` to `completed`, recording the effort.
    ///
    /// Blank `problems` / `insights` are stored as absent; other notes are
    /// stored exactly as given.
    pub async fn complete_task(
        &self,
        task_id: i64,
        completion: TaskCompletion,
    ) -> Result<Task, PlanError> {
        let time_spent = i32::try_from(completion.time_spent)
            .ok()
            .filter(|t| *t >= 0)
            .ok_or_else(|| {
                PlanError::Validation(format!(
                    "time_spent must be a non-negative number of minutes, got {}",
                    completion.time_spent
                ))
            })?;

        let problems = non_blank(completion.problems.as_deref());
        let insights = non_blank(completion.insights.as_deref());

        match task_db::complete_task(&self.pool, task_id, time_spent, problems, insights).await? {
            CompletionOutcome::Completed(task) => {
                info!(task_id, time_spent, "task completed");
                Ok(task)
            }
            CompletionOutcome::NotFound => Err(PlanError::not_found("task", task_id)),
            CompletionOutcome::AlreadyCompleted(_) => Err(PlanError::AlreadyCompleted(task_id)),
        }
    }
}

/// Whitespace-only notes count as absent; anything else is kept verbatim.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}
