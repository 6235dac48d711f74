//! Helpers for reading JSON out of model replies.

/// Strip markdown code fences around a JSON payload.
///
/// Accepts `` ```json ``, bare `` ``` `` and other language tags.
#[must_use]
pub fn strip_markdown_json(content: &str) -> &str {
    let trimmed = content.trim();
    if let Some(inner) = trimmed.strip_prefix("```").and_then(|s| s.strip_suffix("```")) {
        return inner.split_once('\n').map_or_else(|| inner.trim(), |(_, rest)| rest.trim());
    }
    trimmed
}

/// Locate the outermost `{...}` object in a reply that may carry prose around it.
#[must_use]
pub fn extract_json_object(content: &str) -> Option<&str> {
    let stripped = strip_markdown_json(content);
    let start = stripped.find('{')?;
    let end = stripped.rfind('}')?;
    (end > start).then(|| stripped.get(start..=end)).flatten()
}
