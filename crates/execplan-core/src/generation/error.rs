//! Generation error types.

use thiserror::Error;

/// Errors that can occur while asking the model for a list of titles.
///
/// These never cross the [`super::Generator`] boundary; they exist so the
/// failure can be logged precisely before degrading to an empty list.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("response contained no message content")]
    EmptyResponse,

    #[error("response is not a valid {expected} object: {source}")]
    Decode {
        expected: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
