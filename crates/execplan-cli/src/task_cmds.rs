//! CLI handlers for `execplan task` and `execplan subtask` subcommands.

use anyhow::{Result, bail};

use execplan_core::{PlanningService, SubtaskGeneration, TaskCompletion};

use crate::{SubtaskCommands, TaskCommands};

/// Dispatch a `TaskCommands` variant to the appropriate handler.
pub async fn run_task_command(command: TaskCommands, service: &PlanningService) -> Result<()> {
    match command {
        TaskCommands::Complete {
            task_id,
            time_spent,
            problems,
            insights,
        } => {
            let completion = TaskCompletion {
                time_spent,
                problems,
                insights,
            };
            let task = service.complete_task(task_id, completion).await?;
            println!("Task {} completed ({} min).", task.id, task.time_spent);
            Ok(())
        }
        TaskCommands::Subtasks { task_id, model } => {
            match service.generate_subtasks(task_id, model.as_deref()).await? {
                SubtaskGeneration::Generated(subtasks) if subtasks.is_empty() => {
                    println!("No subtasks were generated for task {task_id}.");
                }
                SubtaskGeneration::Generated(subtasks) => {
                    println!("Generated {} subtasks for task {task_id}:", subtasks.len());
                    for subtask in &subtasks {
                        println!("  {:<6} {}", subtask.id, subtask.title);
                    }
                }
                SubtaskGeneration::AlreadyPresent(existing) => {
                    println!("Task {task_id} already has {existing} subtasks; nothing generated.");
                }
            }
            Ok(())
        }
    }
}

/// Dispatch a `SubtaskCommands` variant to the appropriate handler.
pub async fn run_subtask_command(
    command: SubtaskCommands,
    service: &PlanningService,
) -> Result<()> {
    match command {
        SubtaskCommands::Toggle {
            subtask_id,
            done,
            undone,
        } => {
            let is_completed = match (done, undone) {
                (true, false) => true,
                (false, true) => false,
                _ => bail!("pass exactly one of --done or --undone"),
            };
            service.toggle_subtask(subtask_id, is_completed).await?;
            let state = if is_completed { "done" } else { "not done" };
            println!("Subtask {subtask_id} marked {state}.");
            Ok(())
        }
    }
}
