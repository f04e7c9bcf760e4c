//! Persistence layer for the execution planner.
//!
//! Owns the PostgreSQL schema for the Goal -> Task -> SubTask tree and the
//! query functions over it. Higher layers never build SQL themselves.

pub mod config;
pub mod models;
pub mod pool;
pub mod queries;
