//! Output file naming

use crate::format::FormatKind;

/// Fallback stem when a title has no usable characters
pub const FALLBACK_STEM: &str = "ebook";

const MAX_STEM_CHARS: usize = 50;

/// File-system safe stem derived from a document title
///
/// 단어 문자(한글 포함), 공백, `-`만 남기고 50자로 자른다.
pub fn safe_stem(title: &str) -> String {
    let kept: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .take(MAX_STEM_CHARS)
        .collect();

    let stem = kept.trim();
    if stem.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        stem.to_string()
    }
}

/// `<stem>.<ext>`
pub fn file_name(stem: &str, format: FormatKind) -> String {
    format!("{}.{}", stem, format.extension())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_stem() {
        assert_eq!(safe_stem("퇴근 후 100만원 만들기!"), "퇴근 후 100만원 만들기");
        assert_eq!(safe_stem("a/b\\c:d"), "abcd");
        assert_eq!(safe_stem("  ?!  "), FALLBACK_STEM);
        assert_eq!(safe_stem(&"가".repeat(80)).chars().count(), 50);
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("책", FormatKind::Hwpx), "책.hwpx");
    }
}
