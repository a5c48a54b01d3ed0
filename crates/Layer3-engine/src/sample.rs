//! Built-in sample book for the test path
//!
//! AI 호출과 로그인 없이 인코딩 단계만 검증할 때 쓰는 고정 콘텐츠.

use crate::generator::{
    BookOutline, FreeVsPaid, GeneratedBook, Marketing, OutlineChapter, ProblemSolved,
    ValueAnalysis, ValueSummary, WrittenChapter,
};

pub const SAMPLE_TOPIC: &str = "직장인 퇴근 후 월 100만원 부수입 만들기";

struct SampleChapter {
    phase: &'static str,
    title: &'static str,
    before: &'static str,
    after: &'static str,
    body: &'static str,
}

const CHAPTERS: [SampleChapter; 4] = [
    SampleChapter {
        phase: "문제인식",
        title: "왜 지금 부수입이 필요한가",
        before: "월급만으로는 부족하다는 막막함",
        after: "부수입이 왜 필요한지 숫자로 이해한 상태",
        body: "== 월급만으로는 버티기 어려운 이유 ==
물가는 매년 오르지만 연봉 인상률은 그 속도를 따라가지 못합니다. 통장 잔고가 제자리인 이유는 노력이 부족해서가 아니라 구조의 문제입니다.
[핵심 포인트] 수입원이 하나뿐인 삶은 생각보다 위험합니다
- 물가 상승률 연 3~5%, 임금 인상률은 2~3% 수준
- 수입원이 하나면 갑작스러운 퇴사나 휴직에 그대로 노출
- 추가 수입 없이 노후 자금을 모으기는 사실상 어렵다
== 월 100만원이 바꾸는 것 ==
월 100만원은 단순한 용돈이 아니라 선택지를 넓혀 주는 안전장치입니다.
[실전 팁] 1년이면 1,200만원, 10년이면 1억 2천만원의 차이가 생깁니다
- 일찍 시작할수록 복리 효과가 커진다
- 쌓인 경험이 다음 수입원을 만드는 자산이 된다",
    },
    SampleChapter {
        phase: "방법발견",
        title: "나에게 맞는 부수입 방법 찾기",
        before: "무엇부터 시작해야 할지 몰라 망설이는 상태",
        after: "내 상황에 맞는 방법 하나를 고른 상태",
        body: "== 온라인으로 시작하는 방법 ==
노트북 한 대로 시작할 수 있는 방법이 가장 진입 장벽이 낮습니다.
- 전자책: 내가 아는 것을 PDF로 정리해 판매
- 온라인 강의: 강의 플랫폼에 녹화 강의 등록
- 블로그와 영상: 광고와 협찬 수익
- 재능 판매: 디자인, 번역, 문서 작업 대행
== 오프라인으로 시작하는 방법 ==
- 중고 거래로 집 안 물건 정리하기
- 운동, 악기, 요리 같은 개인 레슨
- 주말 행사 스태프 같은 단기 일자리
[핵심 포인트] 방법을 고르는 4가지 기준
1. 지금 가진 기술과 지식
2. 일주일에 낼 수 있는 시간 (5~10시간)
3. 초기 비용 (0~50만원)
4. 첫 수익까지 걸리는 시간",
    },
    SampleChapter {
        phase: "실행",
        title: "첫 달 수입 만들기: 실전 30일",
        before: "계획만 세우고 실행하지 못하는 상태",
        after: "첫 수입을 실제로 만들어 본 상태",
        body: "== 30일 실행 계획 ==
아래 일정을 그대로 따라 하면 한 달 안에 첫 수입을 경험할 수 있습니다.
[1주차] 판매할 것 하나 정하기
- 상품이나 서비스 1개 확정
- 판매 채널 계정 만들고 프로필 채우기
[2주차] 첫 고객 만나기
- 지인 10명에게 먼저 알리기
- 첫 피드백을 받아 바로 고치기
[3주차] 가격과 후기 다듬기
- 가격을 두세 번 바꿔 보며 반응 확인
- 구매 후기를 모아 신뢰 쌓기
[4주차] 다음 단계 준비
- 한 달 성과를 숫자로 정리
- 두 번째 상품 기획 시작",
    },
    SampleChapter {
        phase: "확신",
        title: "수입을 안정화하고 확장하기",
        before: "들쭉날쭉한 수입 때문에 불안한 상태",
        after: "꾸준히 늘어나는 수입 구조를 갖춘 상태",
        body: "== 수입을 안정시키는 법 ==
첫 수입을 만들었다면 이제는 시간을 덜 쓰고도 유지되는 구조를 만들 차례입니다.
[핵심 포인트] 시간을 파는 일에서 자산을 파는 일로 옮겨 가세요
== 3단계 성장 로드맵 ==
1. 시간을 파는 단계: 재능 판매, 레슨으로 월 30~50만원
2. 콘텐츠 단계: 전자책, 강의, 블로그로 월 70~100만원
3. 자산 단계: 반복 판매되는 상품으로 월 100만원 이상
== 실행 체크리스트 ==
- 수입원은 최소 3개 이상 유지하기
- 온라인과 오프라인을 섞어 위험 분산하기
- 한 달에 한 번 성과를 점검하고 계획 고치기",
    },
];

/// Fixed placeholder book
pub fn sample_book() -> GeneratedBook {
    let outline = BookOutline {
        book_title: "퇴근 후 100만원 만들기".to_string(),
        subtitle: "직장인을 위한 부수입 실전 가이드".to_string(),
        chapters: CHAPTERS
            .iter()
            .enumerate()
            .map(|(i, ch)| OutlineChapter {
                phase: ch.phase.to_string(),
                chapter_num: u32::try_from(i + 1).ok(),
                title: ch.title.to_string(),
                before_state: ch.before.to_string(),
                after_state: ch.after.to_string(),
                ..Default::default()
            })
            .collect(),
    };

    let chapters = outline
        .chapters
        .iter()
        .zip(CHAPTERS.iter())
        .map(|(outline, ch)| WrittenChapter {
            outline: outline.clone(),
            body: ch.body.to_string(),
            image: None,
        })
        .collect();

    GeneratedBook {
        analysis: ValueAnalysis {
            topic_refined: SAMPLE_TOPIC.to_string(),
            free_vs_paid: FreeVsPaid {
                verdict: "유료 전환 가능성이 높음".to_string(),
                ..Default::default()
            },
            problem_solved: ProblemSolved {
                time: "수개월의 시행착오를 수주로 단축".to_string(),
                money: "잘못된 투자를 막아 수십만원 절약".to_string(),
                emotion: "막막함 대신 분명한 로드맵".to_string(),
            },
            why_pay: "흩어진 정보를 실행 순서대로 묶어 바로 따라 할 수 있게 만든 책입니다."
                .to_string(),
            target_reader: "부수입을 원하지만 어디서 시작할지 모르는 직장인".to_string(),
        },
        outline,
        chapters,
        marketing: Some(Marketing {
            sales_copy: "이 책은 퇴근 후 남는 시간만으로 첫 부수입을 만드는 순서를 담았습니다. \
                         방법 비교에서 30일 실행 계획까지 한 권으로 이어집니다."
                .to_string(),
            value_summary: ValueSummary {
                time_saved: "6개월의 시행착오 단축".to_string(),
                money_saved: "잘못된 투자 30만원 절약".to_string(),
                mistakes_prevented: "흔한 실수 10가지 예방".to_string(),
            },
        }),
        cover: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_document() {
        let doc = sample_book().to_document(SAMPLE_TOPIC).unwrap();
        assert_eq!(doc.title(), "퇴근 후 100만원 만들기");
        // 가치 + 4개 챕터 + 부록
        assert_eq!(doc.chapters().len(), 6);
        assert_eq!(doc.chapters()[3].label.as_deref(), Some("실행"));
        assert!(doc.char_count() > 500);
    }
}
