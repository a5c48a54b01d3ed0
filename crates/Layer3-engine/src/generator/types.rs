//! AI response shapes
//!
//! 모든 필드는 `#[serde(default)]` - 모델이 필드를 빠뜨려도 파싱은 성공하고,
//! 쓸 수 있는 내용이 있는지는 조립 단계에서 판단한다.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ============================================================================
// Stage 1: value analysis
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueAnalysis {
    pub topic_refined: String,
    pub free_vs_paid: FreeVsPaid,
    pub problem_solved: ProblemSolved,
    pub why_pay: String,
    pub target_reader: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreeVsPaid {
    pub free_consumption_risk: String,
    pub paid_conversion_points: Vec<String>,
    pub verdict: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProblemSolved {
    pub time: String,
    pub money: String,
    pub emotion: String,
}

impl ValueAnalysis {
    /// Anything worth a front chapter
    pub fn has_content(&self) -> bool {
        !(self.problem_solved.time.trim().is_empty()
            && self.problem_solved.money.trim().is_empty()
            && self.problem_solved.emotion.trim().is_empty()
            && self.why_pay.trim().is_empty()
            && self.target_reader.trim().is_empty())
    }
}

// ============================================================================
// Stage 2: outline
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookOutline {
    pub book_title: String,
    pub subtitle: String,
    pub chapters: Vec<OutlineChapter>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineChapter {
    pub phase: String,

    /// 모델이 숫자 대신 "1"이나 "1장"을 돌려주는 경우가 있다
    #[serde(deserialize_with = "lenient_number")]
    pub chapter_num: Option<u32>,

    pub title: String,
    pub purpose: String,
    pub before_state: String,
    pub after_state: String,
    pub sections: Vec<String>,
}

impl OutlineChapter {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// First and second half of the sections (split at `max(1, len/2)`)
    pub fn section_halves(&self) -> (&[String], &[String]) {
        let mid = (self.sections.len() / 2).max(1).min(self.sections.len());
        self.sections.split_at(mid)
    }
}

fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Some(Value::String(s)) => {
            let digits: String = s.chars().filter(char::is_ascii_digit).collect();
            digits.parse().ok()
        }
        _ => None,
    })
}

// ============================================================================
// Stage 4: marketing
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Marketing {
    pub sales_copy: String,
    pub value_summary: ValueSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueSummary {
    pub time_saved: String,
    pub money_saved: String,
    pub mistakes_prevented: String,
}

impl Marketing {
    pub fn has_content(&self) -> bool {
        !(self.sales_copy.trim().is_empty()
            && self.value_summary.time_saved.trim().is_empty()
            && self.value_summary.money_saved.trim().is_empty()
            && self.value_summary.mistakes_prevented.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outline_tolerates_missing_and_odd_fields() {
        let outline: BookOutline = serde_json::from_str(
            r#"{
                "book_title": "책",
                "reader_psychology": {"concerns": []},
                "chapters": [
                    {"chapter_num": "3장", "title": "셋"},
                    {"chapter_num": 4, "title": "넷", "sections": ["a", "b", "c"]},
                    {"title": "번호 없음", "chapter_num": null}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(outline.subtitle, "");
        assert_eq!(outline.chapters[0].chapter_num, Some(3));
        assert_eq!(outline.chapters[1].chapter_num, Some(4));
        assert_eq!(outline.chapters[2].chapter_num, None);
    }

    #[test]
    fn test_section_halves() {
        let mut ch = OutlineChapter::new("t");
        assert_eq!(ch.section_halves(), (&[][..], &[][..]));

        ch.sections = vec!["a".into()];
        let (first, second) = ch.section_halves();
        assert_eq!((first.len(), second.len()), (1, 0));

        ch.sections = (1..=5).map(|i| i.to_string()).collect();
        let (first, second) = ch.section_halves();
        assert_eq!((first.len(), second.len()), (2, 3));
    }

    #[test]
    fn test_empty_analysis_has_no_content() {
        assert!(!ValueAnalysis::default().has_content());
        let analysis: ValueAnalysis =
            serde_json::from_str(r#"{"why_pay": "시간을 아껴준다"}"#).unwrap();
        assert!(analysis.has_content());
    }
}
