//! Pull a JSON value out of model output.

use serde_json::Value;

/// Parse structured output. Accepts bare JSON, a fenced code block, or the
/// outermost `{...}` span of surrounding prose.
pub fn extract_json(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Some(value);
    }

    if let Some(fenced) = fenced_block(trimmed)
        && let Ok(value) = serde_json::from_str(fenced)
    {
        return Some(value);
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&trimmed[start..=end]).ok()
}

fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after_start = &text[start + 3..];
    let body = &after_start[after_start.find('\n')? + 1..];
    let end = body.rfind("```")?;
    Some(body[..end].trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_json() {
        assert_eq!(extract_json(r#" {"a": 1} "#), Some(json!({"a": 1})));
        assert_eq!(extract_json("[1,2]"), Some(json!([1, 2])));
    }

    #[test]
    fn fenced_json() {
        let text = "Here you go:\n```json\n{\"title\": \"Dawn\"}\n```\nEnjoy";
        assert_eq!(extract_json(text), Some(json!({"title": "Dawn"})));
    }

    #[test]
    fn braces_inside_prose() {
        let text = "Sure! {\"action\": \"directResponse\"} Let me know.";
        assert_eq!(extract_json(text), Some(json!({"action": "directResponse"})));
    }

    #[test]
    fn no_json() {
        assert_eq!(extract_json("just words"), None);
        assert_eq!(extract_json("} backwards {"), None);
    }
}
