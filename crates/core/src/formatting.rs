use serde_json::Value;

use crate::error::{Error, Result};

/// Re-indents a JSON document with two spaces.
///
/// # Errors
///
/// [`Error::Json`] if `text` is not JSON.
pub fn pretty_json(what: &str, text: &str) -> Result<String> {
    let value: Value = serde_json::from_str(text).map_err(|e| Error::json_error(what, e))?;
    serde_json::to_string_pretty(&value).map_err(|e| Error::json_error(what, e))
}

/// Trimmed text, pretty-printed when it happens to be JSON.
#[must_use]
pub fn pretty_json_or_raw(text: &str) -> String {
    let trimmed = text.trim();
    serde_json::from_str::<Value>(trimmed)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pretty_json() {
        let pretty = pretty_json("details", r#"{"a":1}"#).unwrap();
        assert_eq!(pretty, "{\n  \"a\": 1\n}");
        assert!(pretty_json("details", "nope").is_err());
    }

    #[test]
    fn test_pretty_json_or_raw() {
        assert_eq!(pretty_json_or_raw("  [1]\n"), "[\n  1\n]");
        assert_eq!(pretty_json_or_raw("  total 0\n"), "total 0");
    }
}
