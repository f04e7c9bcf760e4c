//! Repair and strict decoding of model replies.
//!
//! Replies are expected to hold `{"<key>": [{"title": "..."}, ...]}`, but
//! models often wrap the object in Markdown fences or surround it with
//! prose. [`strip_code_fences`] removes the wrapping; [`parse_titles`]
//! decodes against the exact schema for the requested [`ListKind`].

use serde::Deserialize;

use super::error::GenerationError;
use super::prompt::ListKind;

#[derive(Debug, Deserialize)]
struct TitleItem {
    title: String,
}

#[derive(Debug, Deserialize)]
struct TaskList {
    tasks: Vec<TitleItem>,
}

#[derive(Debug, Deserialize)]
struct SubtaskList {
    subtasks: Vec<TitleItem>,
}

/// Remove ```` ```json ```` / ```` ``` ```` markers and any text outside the
/// outermost JSON object.
pub fn strip_code_fences(raw: &str) -> &str {
    let text = raw.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text).trim();

    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    }
}

/// Decode a model reply into a list of titles.
///
/// Titles are trimmed and blank ones dropped; order is preserved.
pub fn parse_titles(raw: &str, kind: ListKind) -> Result<Vec<String>, GenerationError> {
    let cleaned = strip_code_fences(raw);
    let decode_err = |source| GenerationError::Decode {
        expected: kind.json_key(),
        source,
    };

    let items = match kind {
        ListKind::Tasks => {
            serde_json::from_str::<TaskList>(cleaned)
                .map_err(decode_err)?
                .tasks
        }
        ListKind::Subtasks => {
            serde_json::from_str::<SubtaskList>(cleaned)
                .map_err(decode_err)?
                .subtasks
        }
    };

    Ok(items
        .into_iter()
        .map(|item| item.title.trim().to_owned())
        .filter(|title| !title.is_empty())
        .collect())
}
