//! 기본 AI 프롬프트
//!
//! 설정에서 오버라이드하지 않으면 이 값이 사용된다.

use serde::{Deserialize, Serialize};

const CHAPTER_SYSTEM: &str = "당신은 전자책 집필 전문가입니다. 사람이 실제로 돈을 내고 살 가치가 있는 상품 수준의 글을 작성합니다.

글쓰기 원칙:
- 지식을 그냥 설명하지 말고, 결과가 보이게 정리
- 읽기 전 상태와 읽고 난 후 상태가 명확히 대비되게
- 설명용 문장은 줄이고 \"그래서 뭘 하면 되는지\" 실행 단위로 구성
- 한 문단은 3~5줄, 문단 사이 적절한 여백
- 독자가 바로 실행할 수 있는 구체적 행동 지침 포함
- 실제 사례, 구체적 숫자, 비교 예시를 풍부하게 활용
- 핵심 개념은 반복적으로 다른 표현으로 강조";

const TOC_RULES: &str = "목차 설계 규칙:
1. 총 12~16개 챕터 (반드시 12개 이상)
2. 4단계 구조: 문제인식(3~4장) → 방법발견(3~4장) → 실행(4~5장) → 확신(2~3장)
3. 각 챕터 제목은 \"이건 안 사면 손해다\"라고 느끼게 하는 문장
4. 각 챕터마다 반드시 5~7개 소제목(sections)
5. 설명용 문장이 아닌, 결과가 보이는 실행 중심 제목";

const VALUE_SYSTEM: &str = "당신은 전자책 시장 분석 전문가입니다.
반드시 아래 JSON 형식으로만 응답하세요. 다른 텍스트 없이 순수 JSON만 출력하세요.";

const MARKETING_SYSTEM: &str =
    "당신은 전자책 마케팅 전략 전문가입니다. 반드시 JSON 형식으로만 응답하세요.";

/// 단계별 시스템 프롬프트 묶음
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultPrompts {
    pub chapter_system: String,
    pub toc_rules: String,
    pub value_system: String,
    pub marketing_system: String,
}

impl Default for DefaultPrompts {
    fn default() -> Self {
        Self {
            chapter_system: CHAPTER_SYSTEM.to_string(),
            toc_rules: TOC_RULES.to_string(),
            value_system: VALUE_SYSTEM.to_string(),
            marketing_system: MARKETING_SYSTEM.to_string(),
        }
    }
}
