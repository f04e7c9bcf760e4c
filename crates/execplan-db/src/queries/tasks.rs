//! Database query functions for the `tasks` table.

use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::models::Task;

/// Result of [`complete_task`].
#[derive(Debug, Clone)]
pub enum CompletionOutcome {
    /// The task moved from `pending` to `completed`.
    Completed(Task),
    /// No task with that id exists.
    NotFound,
    /// The task exists but was already completed; nothing was written.
    AlreadyCompleted(Task),
}

/// Append tasks to a goal, one row per title, preserving the given order.
///
/// All rows are inserted in a single transaction. Returns the inserted
/// tasks in the same order as `titles`.
pub async fn insert_tasks(pool: &PgPool, goal_id: i64, titles: &[String]) -> Result<Vec<Task>> {
    let mut tx = pool.begin().await.context("failed to begin transaction")?;

    let mut inserted = Vec::with_capacity(titles.len());
    for title in titles {
        let task = sqlx::query_as::<_, Task>(
            "INSERT INTO tasks (goal_id, title) VALUES ($1, $2) RETURNING *",
        )
        .bind(goal_id)
        .bind(title)
        .fetch_one(&mut *tx)
        .await
        .with_context(|| format!("failed to insert task {title:?}"))?;
        inserted.push(task);
    }

    tx.commit().await.context("failed to commit transaction")?;

    Ok(inserted)
}

/// Fetch a single task by ID.
pub async fn get_task(pool: &PgPool, id: i64) -> Result<Option<Task>> {
    let task = sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch task")?;

    Ok(task)
}

/// List all tasks for a goal in insertion order.
pub async fn list_tasks_for_goal(pool: &PgPool, goal_id: i64) -> Result<Vec<Task>> {
    let tasks = sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE goal_id = $1 ORDER BY id ASC")
        .bind(goal_id)
        .fetch_all(pool)
        .await
        .context("failed to list tasks for goal")?;

    Ok(tasks)
}

/// Mark a pending task completed and record the effort fields.
///
/// The `WHERE status = 'pending'` guard makes the transition one-way: a
/// completed task is never rewritten.
pub async fn complete_task(
    pool: &PgPool,
    id: i64,
    time_spent: i32,
    problems: Option<&str>,
    insights: Option<&str>,
) -> Result<CompletionOutcome> {
    let task = sqlx::query_as::<_, Task>(
        "UPDATE tasks \
         SET status = 'completed', time_spent = $1, problems = $2, insights = $3, \
             completed_at = now() \
         WHERE id = $4 AND status = 'pending' \
         RETURNING *",
    )
    .bind(time_spent)
    .bind(problems)
    .bind(insights)
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("failed to complete task")?;

    if let Some(task) = task {
        return Ok(CompletionOutcome::Completed(task));
    }

    // Distinguish between "not found" and "already completed".
    match get_task(pool, id).await? {
        None => Ok(CompletionOutcome::NotFound),
        Some(existing) => Ok(CompletionOutcome::AlreadyCompleted(existing)),
    }
}
