//! Lightweight paragraph markup
//!
//! AI가 생성한 본문은 `== 소제목 ==`, `[핵심 포인트] ...`, `- 항목`, `1. 항목` 같은
//! 표기를 섞어 쓴다. 인코더들은 문단을 직접 해석하지 않고 여기서 분류된
//! [`Block`]만 렌더링한다.

use regex::Regex;
use std::sync::OnceLock;

/// Classified paragraph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block<'a> {
    /// `== text ==`
    Subheading(&'a str),

    /// `[label] text`
    Callout { label: &'a str, text: &'a str },

    /// `- text`, `• text`, ...
    Bullet(&'a str),

    /// `3. text` / `3) text`
    Numbered { n: u32, text: &'a str },

    Text(&'a str),
}

impl<'a> Block<'a> {
    /// Visible text without markup
    pub fn text(&self) -> &'a str {
        match *self {
            Block::Subheading(t) | Block::Bullet(t) | Block::Text(t) => t,
            Block::Callout { text, .. } | Block::Numbered { text, .. } => text,
        }
    }
}

struct Patterns {
    heading: Regex,
    callout: Regex,
    bullet: Regex,
    numbered: Regex,
}

impl Patterns {
    fn compile() -> Option<Self> {
        Some(Self {
            heading: Regex::new(r"^={2,}\s*(.+?)\s*={2,}$").ok()?,
            callout: Regex::new(r"^\[([^\]]{2,20})\]\s*(.*)$").ok()?,
            bullet: Regex::new(r"^[-•●▶►✓]\s+(.*)$").ok()?,
            numbered: Regex::new(r"^(\d+)[.)]\s+(.+)$").ok()?,
        })
    }
}

static PATTERNS: OnceLock<Option<Patterns>> = OnceLock::new();

fn patterns() -> Option<&'static Patterns> {
    PATTERNS.get_or_init(Patterns::compile).as_ref()
}

/// Classify one paragraph
pub fn classify(paragraph: &str) -> Block<'_> {
    let line = paragraph.trim();
    let Some(patterns) = patterns() else {
        return Block::Text(line);
    };

    if let Some(caps) = patterns.heading.captures(line) {
        if let Some(m) = caps.get(1) {
            return Block::Subheading(m.as_str());
        }
    }

    if let Some(caps) = patterns.callout.captures(line) {
        if let (Some(label), Some(text)) = (caps.get(1), caps.get(2)) {
            return Block::Callout {
                label: label.as_str().trim(),
                text: text.as_str().trim(),
            };
        }
    }

    if let Some(caps) = patterns.bullet.captures(line) {
        if let Some(m) = caps.get(1) {
            return Block::Bullet(m.as_str().trim());
        }
    }

    if let Some(caps) = patterns.numbered.captures(line) {
        if let (Some(n), Some(text)) = (caps.get(1), caps.get(2)) {
            if let Ok(n) = n.as_str().parse() {
                return Block::Numbered {
                    n,
                    text: text.as_str().trim(),
                };
            }
        }
    }

    Block::Text(line)
}

/// Replace emoji and invisible symbols with spaces
///
/// 임베드 폰트에 없는 글리프(이모지, variation selector, zero-width)가
/// 레이아웃을 깨뜨리지 않도록 렌더링 전에 치환한다.
pub fn sanitize_text(text: &str) -> String {
    text.chars()
        .map(|c| if is_unsupported_symbol(c) { ' ' } else { c })
        .collect()
}

fn is_unsupported_symbol(c: char) -> bool {
    let cp = c as u32;
    matches!(cp,
        0x2600..=0x27BF      // misc symbols, dingbats
        | 0xFE00..=0xFE0F    // variation selectors
        | 0x200B..=0x200D    // zero-width
    ) || cp >= 0x10000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subheading() {
        assert_eq!(classify("== 핵심 요약 =="), Block::Subheading("핵심 요약"));
        assert_eq!(classify("=== 소제목 ==="), Block::Subheading("소제목"));
        assert_eq!(classify("= single ="), Block::Text("= single ="));
    }

    #[test]
    fn test_callout() {
        assert_eq!(
            classify("[핵심 포인트] 작게 시작하세요"),
            Block::Callout {
                label: "핵심 포인트",
                text: "작게 시작하세요"
            }
        );
        // label too short / too long
        assert!(matches!(classify("[a] x"), Block::Text(_)));
        assert!(matches!(
            classify("[this label is definitely too long] x"),
            Block::Text(_)
        ));
    }

    #[test]
    fn test_lists() {
        assert_eq!(classify("- 항목"), Block::Bullet("항목"));
        assert_eq!(classify("• 항목"), Block::Bullet("항목"));
        assert_eq!(classify("✓ 체크"), Block::Bullet("체크"));
        assert_eq!(
            classify("12) 열두 번째"),
            Block::Numbered {
                n: 12,
                text: "열두 번째"
            }
        );
        assert_eq!(classify("-붙어있음"), Block::Text("-붙어있음"));
    }

    #[test]
    fn test_block_text() {
        assert_eq!(classify("3. 셋").text(), "셋");
        assert_eq!(classify("  본문  ").text(), "본문");
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize_text("돈💰벌기"), "돈 벌기");
        assert_eq!(sanitize_text("a\u{200B}b"), "a b");
        assert_eq!(sanitize_text("☀ sun"), "  sun");
        assert_eq!(sanitize_text("한글 ABC 123"), "한글 ABC 123");
    }
}
