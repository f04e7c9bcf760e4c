//! Database query functions for the `goals` table, plus the eager loaders
//! that assemble a goal with its whole task tree.

use std::collections::HashMap;

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::debug;

use crate::models::{Goal, GoalWithTasks, SubTask, Task, TaskWithSubtasks};

/// Insert a new goal row. Returns the inserted goal with its server-assigned
/// id and timestamp.
pub async fn insert_goal(pool: &PgPool, title: &str) -> Result<Goal> {
    let goal = sqlx::query_as::<_, Goal>("INSERT INTO goals (title) VALUES ($1) RETURNING *")
        .bind(title)
        .fetch_one(pool)
        .await
        .context("failed to insert goal")?;

    Ok(goal)
}

/// Fetch a goal by its ID.
pub async fn get_goal(pool: &PgPool, id: i64) -> Result<Option<Goal>> {
    let goal = sqlx::query_as::<_, Goal>("SELECT * FROM goals WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch goal")?;

    Ok(goal)
}

/// List all goals in insertion order.
pub async fn list_goals(pool: &PgPool) -> Result<Vec<Goal>> {
    let goals = sqlx::query_as::<_, Goal>("SELECT * FROM goals ORDER BY id ASC")
        .fetch_all(pool)
        .await
        .context("failed to list goals")?;

    Ok(goals)
}

/// Delete a goal, its tasks and their subtasks in one transaction.
///
/// Children are removed before the parent. Returns `false` (and changes
/// nothing) when the goal does not exist.
pub async fn delete_goal(pool: &PgPool, id: i64) -> Result<bool> {
    let mut tx = pool.begin().await.context("failed to begin transaction")?;

    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM goals WHERE id = $1)")
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .context("failed to check goal existence")?;

    if !exists {
        // Dropping the transaction rolls it back.
        return Ok(false);
    }

    let subtasks = sqlx::query(
        "DELETE FROM subtasks WHERE task_id IN (SELECT id FROM tasks WHERE goal_id = $1)",
    )
    .bind(id)
    .execute(&mut *tx)
    .await
    .context("failed to delete subtasks of goal")?;

    let tasks = sqlx::query("DELETE FROM tasks WHERE goal_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("failed to delete tasks of goal")?;

    sqlx::query("DELETE FROM goals WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("failed to delete goal")?;

    tx.commit().await.context("failed to commit transaction")?;

    debug!(
        goal_id = id,
        tasks = tasks.rows_affected(),
        subtasks = subtasks.rows_affected(),
        "goal deleted"
    );
    Ok(true)
}

/// List every goal with its tasks and subtasks attached.
///
/// Runs three queries regardless of tree size and stitches the rows
/// together in memory.
pub async fn list_goal_trees(pool: &PgPool) -> Result<Vec<GoalWithTasks>> {
    let goals = list_goals(pool).await?;
    attach_tasks(pool, goals).await
}

/// Fetch one goal with its tasks and subtasks attached.
pub async fn get_goal_tree(pool: &PgPool, id: i64) -> Result<Option<GoalWithTasks>> {
    let Some(goal) = get_goal(pool, id).await? else {
        return Ok(None);
    };
    let mut trees = attach_tasks(pool, vec![goal]).await?;
    Ok(trees.pop())
}

async fn attach_tasks(pool: &PgPool, goals: Vec<Goal>) -> Result<Vec<GoalWithTasks>> {
    if goals.is_empty() {
        return Ok(Vec::new());
    }

    let goal_ids: Vec<i64> = goals.iter().map(|g| g.id).collect();
    let tasks = sqlx::query_as::<_, Task>(
        "SELECT * FROM tasks WHERE goal_id = ANY($1) ORDER BY id ASC",
    )
    .bind(&goal_ids)
    .fetch_all(pool)
    .await
    .context("failed to load tasks for goals")?;

    let task_ids: Vec<i64> = tasks.iter().map(|t| t.id).collect();
    let subtasks = if task_ids.is_empty() {
        Vec::new()
    } else {
        sqlx::query_as::<_, SubTask>(
            "SELECT * FROM subtasks WHERE task_id = ANY($1) ORDER BY id ASC",
        )
        .bind(&task_ids)
        .fetch_all(pool)
        .await
        .context("failed to load subtasks for tasks")?
    };

    let mut subtasks_by_task: HashMap<i64, Vec<SubTask>> = HashMap::new();
    for subtask in subtasks {
        subtasks_by_task
            .entry(subtask.task_id)
            .or_default()
            .push(subtask);
    }

    let mut tasks_by_goal: HashMap<i64, Vec<TaskWithSubtasks>> = HashMap::new();
    for task in tasks {
        let subtasks = subtasks_by_task.remove(&task.id).unwrap_or_default();
        tasks_by_goal
            .entry(task.goal_id)
            .or_default()
            .push(TaskWithSubtasks { task, subtasks });
    }

    Ok(goals
        .into_iter()
        .map(|goal| {
            let tasks = tasks_by_goal.remove(&goal.id).unwrap_or_default();
            GoalWithTasks { goal, tasks }
        })
        .collect())
}
