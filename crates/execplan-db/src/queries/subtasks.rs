//! Database query functions for the `subtasks` table.

use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::models::SubTask;

/// Append subtasks to a task, one row per title, preserving the given order.
pub async fn insert_subtasks(
    pool: &PgPool,
    task_id: i64,
    titles: &[String],
) -> Result<Vec<SubTask>> {
    let mut tx = pool.begin().await.context("failed to begin transaction")?;

    let mut inserted = Vec::with_capacity(titles.len());
    for title in titles {
        let subtask = sqlx::query_as::<_, SubTask>(
            "INSERT INTO subtasks (task_id, title) VALUES ($1, $2) RETURNING *",
        )
        .bind(task_id)
        .bind(title)
        .fetch_one(&mut *tx)
        .await
        .with_context(|| format!("failed to insert subtask {title:?}"))?;
        inserted.push(subtask);
    }

    tx.commit().await.context("failed to commit transaction")?;

    Ok(inserted)
}

/// Fetch a single subtask by ID.
pub async fn get_subtask(pool: &PgPool, id: i64) -> Result<Option<SubTask>> {
    let subtask = sqlx::query_as::<_, SubTask>("SELECT * FROM subtasks WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch subtask")?;

    Ok(subtask)
}

/// List the subtasks of a task in insertion order.
pub async fn list_subtasks_for_task(pool: &PgPool, task_id: i64) -> Result<Vec<SubTask>> {
    let subtasks =
        sqlx::query_as::<_, SubTask>("SELECT * FROM subtasks WHERE task_id = $1 ORDER BY id ASC")
            .bind(task_id)
            .fetch_all(pool)
            .await
            .context("failed to list subtasks for task")?;

    Ok(subtasks)
}

/// Count the subtasks of a task.
pub async fn count_subtasks(pool: &PgPool, task_id: i64) -> Result<i64> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM subtasks WHERE task_id = $1")
        .bind(task_id)
        .fetch_one(pool)
        .await
        .context("failed to count subtasks")?;

    Ok(row.0)
}

/// Set the completion flag of a subtask.
///
/// Returns `false` when no subtask with that id exists. Setting the flag to
/// its current value is a successful no-op.
pub async fn set_subtask_completed(pool: &PgPool, id: i64, is_completed: bool) -> Result<bool> {
    let result = sqlx::query("UPDATE subtasks SET is_completed = $1 WHERE id = $2")
        .bind(is_completed)
        .bind(id)
        .execute(pool)
        .await
        .context("failed to update subtask")?;

    Ok(result.rows_affected() > 0)
}
