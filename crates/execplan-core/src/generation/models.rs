//! Model selectors offered to users and the backend model ids they map to.

/// Selector used when the caller does not pick one.
pub const DEFAULT_MODEL_SELECTOR: &str = "Gemma3 12b";

/// Backend id used for the default selector and for unknown selectors.
pub const DEFAULT_MODEL_ID: &str = "gemma-3-12b-it";

/// `(selector, backend model id)` pairs.
pub const MODEL_CATALOG: &[(&str, &str)] = &[
    ("Gemini 2.5 Flash", "gemini-2.5-flash"),
    ("Gemma3 12b", "gemma-3-12b-it"),
    ("Gemma3 27b", "gemma-3-27b-it"),
];

/// Map a user-facing selector to a backend model id.
///
/// Unrecognized selectors fall back to [`DEFAULT_MODEL_ID`].
pub fn resolve_model_id(selector: &str) -> &'static str {
    MODEL_CATALOG
        .iter()
        .find(|(name, _)| *name == selector)
        .map(|(_, id)| *id)
        .unwrap_or(DEFAULT_MODEL_ID)
}

/// The selectors a presentation layer may offer, in catalog order.
pub fn selectors() -> impl Iterator<Item = &'static str> {
    MODEL_CATALOG.iter().map(|(name, _)| *name)
}
