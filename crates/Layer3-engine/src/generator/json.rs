//! JSON extraction from model replies

use bookforge_foundation::{Error, Result};
use serde::de::DeserializeOwned;

/// Strip code fences and keep the widest matched `{..}` or `[..]` span
pub fn extract_json(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        // ```json 같은 언어 태그 줄 제거
        text = match rest.split_once('\n') {
            Some((_, body)) => body,
            None => rest,
        };
    }
    let text = text.trim().trim_end_matches("```").trim();

    // 괄호 종류별로 짝을 맞춰 잘라내고 더 긴 쪽을 택한다
    // ("[참고] ... {..}" 같은 설명문의 대괄호에 끌려가지 않도록)
    [('{', '}'), ('[', ']')]
        .iter()
        .filter_map(|&(open, close)| {
            let start = text.find(open)?;
            let end = text.rfind(close)?;
            (start < end).then(|| &text[start..=end])
        })
        .max_by_key(|span| span.len())
        .unwrap_or(text)
}

/// Decode a reply; never retried, a bad shape is `ContentParse`
pub fn parse_reply<T: DeserializeOwned>(stage: &str, raw: &str) -> Result<T> {
    serde_json::from_str(extract_json(raw))
        .map_err(|e| Error::ContentParse(format!("{}: {}", stage, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_fenced_block() {
        let raw = "```json\n{\"a\": 1}\n```";
        assert_eq!(extract_json(raw), "{\"a\": 1}");
    }

    #[test]
    fn test_surrounding_prose() {
        let raw = "여기 결과입니다:\n{\"a\": {\"b\": [1, 2]}}\n감사합니다.";
        assert_eq!(extract_json(raw), "{\"a\": {\"b\": [1, 2]}}");
    }

    #[test]
    fn test_bracketed_prose_before_object() {
        let raw = "[참고] 아래는 요청하신 분석입니다.\n{\"a\": 1}";
        assert_eq!(extract_json(raw), "{\"a\": 1}");
        let value: Value = parse_reply("analysis", raw).unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn test_array_reply_and_trailing_note() {
        assert_eq!(extract_json("[{\"a\": 1}, {\"b\": 2}]"), "[{\"a\": 1}, {\"b\": 2}]");
        assert_eq!(extract_json("{\"a\": [1]} [끝]"), "{\"a\": [1]}");
    }

    #[test]
    fn test_parse_failure_is_content_parse() {
        let err = parse_reply::<Value>("outline", "죄송합니다. 답변할 수 없습니다.").unwrap_err();
        assert!(matches!(err, Error::ContentParse(ref m) if m.starts_with("outline")));
    }
}
