//! Query functions, one module per table.

pub mod goals;
pub mod subtasks;
pub mod tasks;
