//! Locate and parse the JSON object inside raw model output.
//!
//! Models wrap their JSON in prose or markdown code fences often enough that
//! a plain `serde_json::from_str` is not usable. A single pass finds the first
//! `{` and scans to its matching `}`, honouring string literals and escapes.

/// Errors from [`extract_json_object`].
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("model output is empty")]
    Empty,

    #[error("model output contains no JSON object")]
    NoObject,

    #[error("model output contains an unterminated JSON object")]
    Unbalanced,

    #[error("model output is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Return the slice spanning the first balanced top-level `{ ... }` in `text`.
pub fn find_json_object(text: &str) -> Result<&str, ExtractError> {
    if text.trim().is_empty() {
        return Err(ExtractError::Empty);
    }

    let start = text.find('{').ok_or(ExtractError::NoObject)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let end = start + offset + ch.len_utf8();
                    return Ok(&text[start..end]);
                }
            }
            _ => {}
        }
    }

    Err(ExtractError::Unbalanced)
}

/// Extract and parse the first JSON object embedded in `text`.
pub fn extract_json_object(text: &str) -> Result<serde_json::Value, ExtractError> {
    let raw = find_json_object(text)?;
    Ok(serde_json::from_str(raw)?)
}
