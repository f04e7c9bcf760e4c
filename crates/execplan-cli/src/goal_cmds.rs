//! CLI handlers for `execplan goal` subcommands.
//!
//! Implements:
//! - `execplan goal create <title>` -- create a goal and generate its tasks
//! - `execplan goal list`           -- list all goals with progress
//! - `execplan goal show <id>`      -- show one goal with tasks and subtasks
//! - `execplan goal delete <id>`    -- delete a goal and everything it owns

use anyhow::Result;

use execplan_core::PlanningService;
use execplan_db::models::{GoalWithTasks, TaskStatus};

use crate::GoalCommands;

// -----------------------------------------------------------------------
// Public entry point
// -----------------------------------------------------------------------

/// Dispatch a `GoalCommands` variant to the appropriate handler.
pub async fn run_goal_command(command: GoalCommands, service: &PlanningService) -> Result<()> {
    match command {
        GoalCommands::Create { title, model } => cmd_create(service, &title, model.as_deref()).await,
        GoalCommands::List => cmd_list(service).await,
        GoalCommands::Show { goal_id } => cmd_show(service, goal_id).await,
        GoalCommands::Delete { goal_id } => cmd_delete(service, goal_id).await,
    }
}

// -----------------------------------------------------------------------
// execplan goal create <title>
// -----------------------------------------------------------------------

async fn cmd_create(service: &PlanningService, title: &str, model: Option<&str>) -> Result<()> {
    let goal = service.create_goal(title, model).await?;

    println!("Goal created.");
    println!();
    println!("  Goal ID: {}", goal.goal.id);
    println!("  Title:   {}", goal.goal.title);
    println!("  Tasks:   {}", goal.tasks.len());

    if goal.tasks.is_empty() {
        println!();
        println!("No tasks were generated. Check the logs for generation errors.");
    } else {
        println!();
        print_task_table(&goal);
    }

    Ok(())
}

// -----------------------------------------------------------------------
// execplan goal list
// -----------------------------------------------------------------------

async fn cmd_list(service: &PlanningService) -> Result<()> {
    let goals = service.list_goals().await?;

    if goals.is_empty() {
        println!("No goals found.");
        return Ok(());
    }

    println!("{:<8} {:<12} {:<20} TITLE", "ID", "PROGRESS", "CREATED");
    println!("{}", "-".repeat(72));
    for goal in &goals {
        println!(
            "{:<8} {:<12} {:<20} {}",
            goal.goal.id,
            format!("{}/{}", goal.completed_count(), goal.tasks.len()),
            goal.goal.created_at.format("%Y-%m-%d %H:%M:%S"),
            goal.goal.title
        );
    }

    Ok(())
}

// -----------------------------------------------------------------------
// execplan goal show <id>
// -----------------------------------------------------------------------

async fn cmd_show(service: &PlanningService, goal_id: i64) -> Result<()> {
    let goal = service.get_goal(goal_id).await?;

    println!("Goal: {}", goal.goal.title);
    println!("  ID:       {}", goal.goal.id);
    println!("  Created:  {}", goal.goal.created_at.format("%Y-%m-%d %H:%M:%S"));
    println!(
        "  Progress: {}/{} tasks completed",
        goal.completed_count(),
        goal.tasks.len()
    );
    println!();

    if goal.tasks.is_empty() {
        println!("No tasks.");
        return Ok(());
    }

    print_task_table(&goal);

    for entry in &goal.tasks {
        let task = &entry.task;
        if task.status != TaskStatus::Completed && entry.subtasks.is_empty() {
            continue;
        }
        println!();
        println!("Task {}: {}", task.id, task.title);
        if task.status == TaskStatus::Completed {
            println!("  Time spent: {} min", task.time_spent);
            if let Some(problems) = &task.problems {
                println!("  Problems:   {problems}");
            }
            if let Some(insights) = &task.insights {
                println!("  Insights:   {insights}");
            }
        }
        for subtask in &entry.subtasks {
            let mark = if subtask.is_completed { "x" } else { " " };
            println!("  [{mark}] {:<6} {}", subtask.id, subtask.title);
        }
    }

    Ok(())
}

// -----------------------------------------------------------------------
// execplan goal delete <id>
// -----------------------------------------------------------------------

async fn cmd_delete(service: &PlanningService, goal_id: i64) -> Result<()> {
    service.delete_goal(goal_id).await?;
    println!("Goal {goal_id} deleted.");
    Ok(())
}

// -----------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------

fn print_task_table(goal: &GoalWithTasks) {
    println!("{:<8} {:<10} {:<10} {:<10} TITLE", "ID", "STATUS", "TIME", "SUBTASKS");
    println!("{}", "-".repeat(72));
    for entry in &goal.tasks {
        let done = entry.subtasks.iter().filter(|s| s.is_completed).count();
        println!(
            "{:<8} {:<10} {:<10} {:<10} {}",
            entry.task.id,
            entry.task.status,
            format!("{}m", entry.task.time_spent),
            format!("{done}/{}", entry.subtasks.len()),
            entry.task.title
        );
    }
}
