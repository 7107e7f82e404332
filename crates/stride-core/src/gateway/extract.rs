//! Turning raw reply text into a JSON object.
//!
//! Services sometimes wrap the object in prose or code fences even when asked
//! not to. [`parse_reply`] first tries the text as-is and only then falls back
//! to [`extract_first_balanced_object`].

use log::{debug, warn};
use serde_json::Value;

use crate::error::{CoachError, Result};

/// Parses `raw` into a JSON object.
///
/// # Errors
///
/// [`CoachError::ParseFailure`] when neither the whole text nor its first
/// balanced `{...}` region is a JSON object.
pub fn parse_reply(operation: &'static str, raw: &str) -> Result<Value> {
    match serde_json::from_str::<Value>(raw.trim()) {
        Ok(value @ Value::Object(_)) => return Ok(value),
        Ok(other) => debug!("{operation} reply is JSON but not an object: {other}"),
        Err(e) => debug!("{operation} reply is not plain JSON: {e}"),
    }

    let Some(candidate) = extract_first_balanced_object(raw) else {
        return Err(CoachError::ParseFailure {
            operation,
            reason: "no JSON object found in reply".to_string(),
        });
    };

    warn!("{operation} reply needed fallback extraction");
    match serde_json::from_str::<Value>(candidate) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(_) => Err(CoachError::ParseFailure {
            operation,
            reason: "extracted region is not an object".to_string(),
        }),
        Err(e) => Err(CoachError::ParseFailure {
            operation,
            reason: e.to_string(),
        }),
    }
}

/// Returns the first balanced `{...}` region of `text`.
///
/// Scanning starts at the first `{`. Braces inside JSON string literals do
/// not count, and escaped quotes do not end a literal. Returns `None` when
/// there is no `{` or the first one is never closed.
pub fn extract_first_balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, byte) in text.as_bytes()[start..].iter().enumerate() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}
