// Text cleanup for raw LLM output: reasoning-tag stripping, JSON extraction,
// fenced code block handling. Pure functions, no orchestration state.

/// Drop a leading `<think>...</think>` reasoning block, if present.
///
/// Models like DeepSeek-R1 emit their chain of thought inside these tags
/// before the actual answer. Only a complete open/close pair is stripped;
/// anything else is returned untouched.
pub fn strip_think_tags(text: &str) -> &str {
    if text.contains("<think>") {
        if let Some(end) = text.find("</think>") {
            return text[end + "</think>".len()..].trim();
        }
    }
    text
}

/// Extract the first JSON object or array embedded in free-form text.
///
/// Finds the earliest `{` or `[` and pairs it with the last matching closer,
/// which is enough for "JSON surrounded by prose" LLM answers.
pub fn extract_json(text: &str) -> Option<&str> {
    let obj = text.find('{');
    let arr = text.find('[');

    match (obj, arr) {
        (Some(o), Some(a)) if a < o => delimited(text, a, ']'),
        (Some(o), _) => delimited(text, o, '}'),
        (None, Some(a)) => delimited(text, a, ']'),
        (None, None) => None,
    }
}

fn delimited(text: &str, start: usize, close: char) -> Option<&str> {
    let end = text.rfind(close)?;
    if end <= start {
        return None;
    }
    Some(&text[start..=end])
}

/// Extract the first fenced code block as `(language, code)`.
///
/// A fence with no language tag yields `"text"`. Returns `None` when the
/// text contains no complete fence.
pub fn extract_code_block(text: &str) -> Option<(String, String)> {
    let start = text.find("```")?;
    let after = &text[start + 3..];
    let newline = after.find('\n')?;

    let language = after[..newline].trim();
    let language = if language.is_empty() {
        "text".to_string()
    } else {
        language.to_string()
    };

    let rest = &after[newline + 1..];
    let end = rest.find("```")?;
    Some((language, rest[..end].trim().to_string()))
}

/// Remove every fenced code block, leaving the surrounding prose.
///
/// Used to turn a code-plus-commentary answer into just the explanation.
/// An unterminated fence swallows the remainder of the text.
pub fn strip_code_blocks(text: &str) -> String {
    let mut out = String::new();
    let mut rest = text;

    while let Some(start) = rest.find("```") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 3..];
        match after.find("```") {
            Some(end) => rest = &after[end + 3..],
            None => return out.trim().to_string(),
        }
    }

    out.push_str(rest);
    out.trim().to_string()
}

/// Best-effort language guess for code that arrived without a fence tag.
pub fn guess_language(code: &str) -> &'static str {
    if code.contains("def ") && (code.contains(':') || code.contains("import ")) {
        "python"
    } else if code.contains("function ") && (code.contains('{') || code.contains("=>")) {
        "javascript"
    } else if code.contains("public class ") || code.contains("import java.") {
        "java"
    } else {
        "text"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_think_tags_removes_reasoning() {
        let text = "<think>step 1... step 2...</think>\n{\"steps\": []}";
        assert_eq!(strip_think_tags(text), "{\"steps\": []}");
    }

    #[test]
    fn test_strip_think_tags_requires_both_tags() {
        let unclosed = "<think>still going";
        assert_eq!(strip_think_tags(unclosed), unclosed);

        let plain = "no tags here";
        assert_eq!(strip_think_tags(plain), plain);
    }

    #[test]
    fn test_extract_json_object_from_prose() {
        let text = "Here is the plan:\n{\"steps\": [1, 2]}\nHope that helps!";
        assert_eq!(extract_json(text), Some("{\"steps\": [1, 2]}"));
    }

    #[test]
    fn test_extract_json_prefers_earliest_start() {
        // The array opens before the object, so the array wins.
        let text = "[{\"type\": \"swe\"}]";
        assert_eq!(extract_json(text), Some("[{\"type\": \"swe\"}]"));
    }

    #[test]
    fn test_extract_json_none_without_json() {
        assert_eq!(extract_json("just words"), None);
        assert_eq!(extract_json("} backwards {"), None);
    }

    #[test]
    fn test_extract_code_block_with_language() {
        let text = "Sure:\n```python\nprint('hi')\n```\nDone.";
        let (language, code) = extract_code_block(text).unwrap();
        assert_eq!(language, "python");
        assert_eq!(code, "print('hi')");
    }

    #[test]
    fn test_extract_code_block_without_language() {
        let text = "```\nplain contents\n```";
        let (language, code) = extract_code_block(text).unwrap();
        assert_eq!(language, "text");
        assert_eq!(code, "plain contents");
    }

    #[test]
    fn test_extract_code_block_none_when_unfenced() {
        assert_eq!(extract_code_block("no fences"), None);
        assert_eq!(extract_code_block("```python\nunterminated"), None);
    }

    #[test]
    fn test_strip_code_blocks_keeps_prose() {
        let text = "Intro.\n```python\nprint('hi')\n```\nOutro.";
        assert_eq!(strip_code_blocks(text), "Intro.\n\nOutro.");
    }

    #[test]
    fn test_strip_code_blocks_multiple_fences() {
        let text = "A ```rust\nx\n``` B ```c\ny\n``` C";
        assert_eq!(strip_code_blocks(text), "A  B  C");
    }

    #[test]
    fn test_guess_language_heuristics() {
        assert_eq!(guess_language("import os\ndef main():\n    pass"), "python");
        assert_eq!(guess_language("function add(a, b) { return a + b; }"), "javascript");
        assert_eq!(guess_language("public class Main {}"), "java");
        assert_eq!(guess_language("SELECT 1;"), "text");
    }
}
