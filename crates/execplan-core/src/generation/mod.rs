//! Generation client: prompt construction, the chat-completion transport,
//! and response repair/decoding.
//!
//! # Architecture
//!
//! ```text
//! PlanningService
//!     |
//!     v
//! &dyn Generator --generate_tasks(goal, model)--> Vec<String>
//!     |
//!     v
//! LlmGenerator: resolve model -> build prompt -> ChatCompletion::complete
//!                                            -> strip fences -> decode
//!     |
//!     v
//! any failure is logged and becomes an empty list
//! ```

pub mod client;
pub mod error;
pub mod generator;
pub mod models;
pub mod parse;
pub mod prompt;

pub use client::{ChatCompletion, GenerationConfig, OpenAiCompatClient};
pub use error::GenerationError;
pub use generator::{Generator, LlmGenerator};
pub use models::{DEFAULT_MODEL_ID, DEFAULT_MODEL_SELECTOR, resolve_model_id};
pub use parse::{parse_titles, strip_code_fences};
pub use prompt::{ListKind, build_prompt};
