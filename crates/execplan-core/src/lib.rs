//! Planning logic for the execution planner.
//!
//! - [`generation`] talks to the text-generation endpoint and turns its
//!   replies into task and subtask titles.
//! - [`service`] orchestrates the user-facing operations over the
//!   persistence layer in `execplan-db`.

pub mod generation;
pub mod service;

pub use generation::{Generator, LlmGenerator};
pub use service::{PlanError, PlanningService, SubtaskGeneration, TaskCompletion};
