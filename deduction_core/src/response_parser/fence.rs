//! Markdown code-fence removal for model output.

const FENCE: &str = "```";

/// Strip a surrounding markdown code fence, if any.
///
/// An opening fence is removed through the end of its line (dropping a
/// language tag such as `json`), a closing fence is removed from the end.
pub fn strip_code_fence(raw: &str) -> &str {
    let mut text = raw.trim();

    if text.starts_with(FENCE) {
        text = match text.find('\n') {
            Some(idx) => &text[idx + 1..],
            // Single-line fence: drop the marker and its language tag.
            None => text[FENCE.len()..].trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
        };
    }

    text = text.trim_end();
    if let Some(stripped) = text.strip_suffix(FENCE) {
        text = stripped;
    }

    text.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_json_untouched() {
        assert_eq!(strip_code_fence("  {\"a\": 1}\n"), "{\"a\": 1}");
    }

    #[test]
    fn test_json_fence() {
        let raw = "```json\n{\"evaluation\": \"Incorrect\"}\n```";
        assert_eq!(strip_code_fence(raw), "{\"evaluation\": \"Incorrect\"}");
    }

    #[test]
    fn test_bare_fence() {
        let raw = "\n```\n{\"a\": 1}\n```\n\n";
        assert_eq!(strip_code_fence(raw), "{\"a\": 1}");
    }

    #[test]
    fn test_single_line_fence() {
        assert_eq!(strip_code_fence("```json{\"a\": 1}```"), "{\"a\": 1}");
    }

    #[test]
    fn test_only_closing_fence() {
        assert_eq!(strip_code_fence("{\"a\": 1}\n```"), "{\"a\": 1}");
    }

    #[test]
    fn test_empty_fence() {
        assert_eq!(strip_code_fence("```"), "");
        assert_eq!(strip_code_fence(""), "");
    }
}
