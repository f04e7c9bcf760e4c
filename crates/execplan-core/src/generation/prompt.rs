//! Prompt construction.
//!
//! The target models reject system-role messages and JSON response mode, so
//! the instructions and the payload travel together in one user message.

/// Which list the model is asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Tasks,
    Subtasks,
}

impl ListKind {
    /// The JSON key holding the array of `{title}` objects.
    pub fn json_key(self) -> &'static str {
        match self {
            Self::Tasks => "tasks",
            Self::Subtasks => "subtasks",
        }
    }

    fn instructions(self) -> &'static str {
        match self {
            Self::Tasks => TASK_INSTRUCTIONS,
            Self::Subtasks => SUBTASK_INSTRUCTIONS,
        }
    }

    fn payload_label(self) -> &'static str {
        match self {
            Self::Tasks => "Goal",
            Self::Subtasks => "Task",
        }
    }
}

const TASK_INSTRUCTIONS: &str = r#"You are an execution planner.
Break the goal into 5-15 small actionable tasks based on task complexity.
Return the output strictly in JSON format:
{
  "tasks": [
    {"title": "Task 1"},
    {"title": "Task 2"}
  ]
}"#;

const SUBTASK_INSTRUCTIONS: &str = r#"You are an expert task decomposer.
Break the following task into 3-5 distinct, tiny micro-steps (subtasks).
Return the output strictly in JSON format:
{
  "subtasks": [
    {"title": "Step 1"},
    {"title": "Step 2"}
  ]
}"#;

/// Build the single user message sent to the model.
pub fn build_prompt(kind: ListKind, text: &str) -> String {
    format!(
        "{}\n\n{}: {}\n\nReturn ONLY the JSON object.",
        kind.instructions(),
        kind.payload_label(),
        text.trim(),
    )
}
