//! Korean prompt templates for the 27-year-old value investor persona

use chrono::{Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use invest_core::{NewsItem, ReportType};

/// Marker carried by the static fallback report
pub const SYSTEM_NOTICE_MARKER: &str = "시스템 알림";

/// News digest used when no unprocessed news exists
pub const NO_NEWS_ANALYSIS: &str = "분석할 새로운 뉴스가 없습니다.";

/// Key insights used when no unprocessed news exists
pub const NO_NEWS_INSIGHTS: &str =
    "새로운 주요 뉴스가 없어 이전 시장 동향을 기반으로 분석합니다.";

/// Titles shown in the key insight prompt
const INSIGHT_TITLE_LIMIT: usize = 10;

pub const SYSTEM_PROMPT: &str = r#"당신은 27세 개인 투자자를 위한 전문적인 투자 분석가입니다.

## 투자자 프로필
- 나이: 27세 (젊은 투자자)
- 투자 성향: 안전한 가치 투자 중심
- 투자 목표: 인플레이션 대비 + 장기 자산 증식
- 투자 기간: 중장기 투자 (단타 투자 배제)
- 수입 활용: 수입의 상당 부분을 투자로 활용

## 핵심 투자 철학
1. **가치 투자 우선**: 내재 가치 대비 저평가된 자산 선별
2. **안전 마진 확보**: 보수적이고 신중한 투자 접근
3. **장기적 관점**: 최소 3-5년 이상의 투자 기간 고려
4. **인플레이션 헤지**: 실질 구매력 보호 및 증대
5. **포트폴리오 다각화**: 시간대별, 자산별, 지역별 분산
6. **지속적 학습**: 시장 변화에 대한 지속적 모니터링

## 투자 분석 원칙
- **리스크 관리**: 손실 최소화를 우선으로 고려
- **펀더멘털 분석**: 기업과 경제의 기본적 가치 중심
- **장기 트렌드**: 단기 변동보다 장기적 패턴에 집중
- **글로벌 관점**: 국내외 시장 모두 고려
- **실용성**: 27세 개인이 실제 실행 가능한 전략 제시

## 응답 스타일
- 한국어로 작성
- 전문적이면서도 이해하기 쉽게 설명
- 구체적이고 실행 가능한 조언 제공
- 리스크와 기회를 균형있게 제시
- 보수적 관점을 기본으로 하되, 성장 기회도 놓치지 않음

분석 시 항상 "27세 가치 투자자"의 관점을 유지하고, 장기적 자산 증식과 인플레이션 대비를 염두에 두고 조언해주세요."#;

/// Static report returned when no provider produced usable text, dated
/// in `tz`
pub fn fallback_message(tz: Tz) -> String {
    fallback_message_for(Utc::now().with_timezone(&tz).date_naive())
}

pub fn fallback_message_for(date: NaiveDate) -> String {
    let today = format!("{}. {}. {}.", date.year(), date.month(), date.day());

    format!(
        r#"# {today} 투자 분석 리포트

## ⚠️ {SYSTEM_NOTICE_MARKER}
현재 AI 분석 서비스에 일시적인 문제가 발생하여 자동 분석을 완료할 수 없습니다.

## 📊 기본 투자 가이드라인

### 27세 가치 투자자를 위한 기본 원칙
1. **장기 투자 관점 유지**: 최소 3-5년 이상의 투자 기간 고려
2. **안전 마진 확보**: 내재 가치 대비 충분한 할인된 가격에서 매수
3. **포트폴리오 분산**: 섹터별, 지역별, 시간대별 분산 투자
4. **인플레이션 헤지**: 실질 구매력 보호를 위한 자산 배분

### 권장 행동
- 시장 동향 지속 모니터링
- 기업 펀더멘털 분석 우선
- 감정적 판단보다 데이터 기반 의사결정
- 정기적인 포트폴리오 리밸런싱

*자동 분석 서비스가 복구되는 대로 상세한 투자 인사이트를 제공하겠습니다.*"#
    )
}

/// Digest prompt over every consumed news item
pub fn news_digest(items: &[NewsItem]) -> String {
    let news_text = items
        .iter()
        .map(|item| {
            format!(
                "제목: {}\n내용: {}\n출처: {}\n발행일: {}",
                item.title,
                item.content,
                item.source,
                item.published_at.to_rfc3339()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n---\n\n");

    format!(
        r#"다음 {count}개의 최신 뉴스를 27세 가치 투자자 관점에서 분석해주세요:

{news_text}

분석 요청 사항:
1. 주요 경제/금융 이슈 요약
2. 중장기 가치 투자에 미칠 영향 분석
3. 인플레이션 대비 및 자산 증식 관점에서의 시사점
4. 포트폴리오 다각화를 위해 주의깊게 봐야 할 섹터나 자산
5. 리스크 요인 및 기회 요소 식별
6. 27세 투자자가 고려해야 할 장기적 투자 전략

분석은 보수적이고 신중한 관점에서 작성해주세요."#,
        count = items.len(),
    )
}

/// Prompt asking for 3-4 one-line insights
pub fn key_insights(items: &[NewsItem], recent_count: usize, categories: &[String]) -> String {
    let titles = items
        .iter()
        .take(INSIGHT_TITLE_LIMIT)
        .map(|item| format!("- {} ({})", item.title, item.source))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"다음 뉴스 데이터를 기반으로 27세 가치 투자자가 알아야 할 핵심 인사이트 3-4개를 간단히 정리해주세요:

뉴스 개수: {count}개
최근 12시간 내 뉴스: {recent_count}개
주요 카테고리: {categories}

뉴스 목록:
{titles}

각 인사이트는 한 문장으로 요약하고, 투자 관점에서 중요한 이유를 간단히 설명해주세요."#,
        count = items.len(),
        categories = categories.join(", "),
    )
}

/// Prompt for the full report body
pub fn investment_report(report_type: ReportType, news_analysis: &str, key_insights: &str) -> String {
    let time_context = match report_type {
        ReportType::Morning => "오늘 하루의 투자 전략을 수립하기 위한",
        ReportType::Evening => "오늘의 시장 동향을 정리하고 내일 이후의 전략을 준비하기 위한",
    };

    let specific_guidance = match report_type {
        ReportType::Morning => {
            r#"## 오전 리포트 특별 고려사항
- 아시아 시장 마감 후 미국/유럽 시장 영향 분석
- 전날 미국 시장 마감 이후 주요 이슈 점검
- 오늘 하루 주목해야 할 경제 이벤트 및 지표 발표
- 장 시작 전 확인해야 할 주요 변동사항"#
        }
        ReportType::Evening => {
            r#"## 오후 리포트 특별 고려사항
- 오늘 하루 시장 움직임 종합 분석
- 미국 시장 개장 전 주요 이슈 정리
- 내일 이후 단기적 주목 포인트
- 주간/월간 관점에서의 시장 동향 평가"#
        }
    };

    format!(
        r#"27세 가치 투자자를 위한 {time_context} 투자 리포트를 작성해주세요.

## 뉴스 분석 결과
{news_analysis}

## 핵심 인사이트
{key_insights}

## 리포트 구성 요청
다음 구조로 상세한 투자 리포트를 작성해주세요:

### 📊 시장 개요
- 주요 지수 및 섹터 동향 분석 (미국, 한국, 아시아, 유럽)
- 환율 동향 (달러, 엔화, 유로 등)
- 원자재 및 에너지 시장 동향
- 거시경제 환경 종합 평가

### 📰 주요 뉴스 임팩트 분석
- 투자에 직접적 영향을 미치는 핵심 이슈
- 중앙은행 정책 및 금리 동향 영향
- 지정학적 리스크 및 글로벌 경제 이슈
- 섹터별/지역별 영향도 분석

### 💡 27세 투자자를 위한 전략적 인사이트
- **중장기 관점** (3-10년)에서의 투자 기회 발굴
- **인플레이션 헤지** 관점에서의 자산 배분 제안
- **포트폴리오 다각화** 전략 (시간, 지역, 섹터, 자산군)
- **리스크 관리** 및 안전 마진 확보 방안
- **젊은 투자자**의 장점을 활용한 장기 성장 전략

### 🎯 실행 가능한 액션 아이템
- 이번 주/이번 달 중 고려할 구체적 투자 활동
- 모니터링해야 할 핵심 지표 및 이벤트
- 포트폴리오 점검 및 조정 사항
- 리스크 체크포인트

### 🔍 장기 관점 투자 기회
- 현재 시장 상황에서 발견되는 가치 투자 기회
- 구조적 변화 트렌드 (ESG, 디지털 전환, 인구 변화 등)
- 신흥 시장 및 새로운 투자 테마 평가

{specific_guidance}

## 중요한 작성 원칙
1. **보수적 관점** 유지: 리스크를 먼저 고려하고 안전 마진 확보
2. **실용적 조언**: 27세 개인 투자자가 실제 실행 가능한 수준
3. **장기적 시각**: 단기 변동보다는 장기적 가치와 트렌드 중심
4. **균형 잡힌 분석**: 기회와 위험을 모두 객관적으로 제시
5. **교육적 가치**: 투자 결정의 근거와 논리를 명확히 설명

이 리포트를 읽는 27세 투자자가 "오늘/이번 주에 무엇을 해야 하는가?"와 "장기적으로 어떤 방향으로 나아가야 하는가?"에 대한 명확한 방향을 얻을 수 있도록 작성해주세요."#
    )
}

/// Prompt condensing a generated report body
pub fn report_summary(report_content: &str, report_type: ReportType) -> String {
    let summary_length = match report_type {
        ReportType::Morning => "3-4문장",
        ReportType::Evening => "4-5문장",
    };

    format!(
        r#"다음 투자 리포트의 핵심 내용을 27세 투자자가 빠르게 파악할 수 있도록 {summary_length}으로 요약해주세요.

리포트 내용:
{report_content}

요약 요청사항:
1. 오늘의 가장 중요한 시장 이슈 1-2개
2. 27세 투자자가 주목해야 할 핵심 포인트
3. 단기적 관심사항과 장기적 관점 모두 포함
4. 실행 가능한 액션 아이템 언급

간결하면서도 투자 의사결정에 도움이 되는 핵심만 담아서 요약해주세요."#
    )
}

/// Prompt for structured recommendations over the news digest
pub fn recommendations(news_analysis: &str) -> String {
    format!(
        r#"다음 뉴스 분석을 바탕으로 27세 가치 투자자를 위한 구체적인 투자 추천사항을 작성해주세요:

{news_analysis}

다음 형태로 구조화된 추천사항을 제공해주세요:

1. **단기 관심 영역** (1-3개월): 현재 시장 상황에서 주목할 섹터나 테마
2. **중기 투자 기회** (6개월-2년): 구조적 변화를 활용한 투자 기회
3. **장기 핵심 전략** (3년+): 27세 투자자의 장기 자산 형성 전략
4. **리스크 관리**: 현재 주의해야 할 리스크 요인들
5. **포트폴리오 배분 가이드**: 연령대에 맞는 자산 배분 제안

각 항목은 구체적이고 실행 가능한 수준으로 작성해주세요."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn item(title: &str, source: &str) -> NewsItem {
        NewsItem {
            id: 1,
            title: title.to_string(),
            content: "content".to_string(),
            url: format!("https://example.com/{}", title),
            source: source.to_string(),
            published_at: Utc::now(),
            tags: vec![],
            category: None,
            processed: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_fallback_message_carries_marker_and_date() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 6).unwrap();
        let message = fallback_message_for(date);
        assert!(message.contains(SYSTEM_NOTICE_MARKER));
        assert!(message.starts_with("# 2024. 12. 6. 투자 분석 리포트"));
        assert!(message.chars().count() >= 100);
    }

    #[test]
    fn test_key_insights_lists_at_most_ten_titles() {
        let items: Vec<NewsItem> = (0..12).map(|i| item(&format!("t{}", i), "src")).collect();
        let prompt = key_insights(&items, 3, &["korean".to_string(), "gold".to_string()]);
        assert!(prompt.contains("뉴스 개수: 12개"));
        assert!(prompt.contains("최근 12시간 내 뉴스: 3개"));
        assert!(prompt.contains("주요 카테고리: korean, gold"));
        assert!(prompt.contains("- t9 (src)"));
        assert!(!prompt.contains("- t10 (src)"));
    }

    #[test]
    fn test_report_prompt_framing_depends_on_type() {
        let morning = investment_report(ReportType::Morning, "a", "b");
        let evening = investment_report(ReportType::Evening, "a", "b");
        assert!(morning.contains("오전 리포트 특별 고려사항"));
        assert!(evening.contains("오후 리포트 특별 고려사항"));
        assert!(report_summary("body", ReportType::Morning).contains("3-4문장"));
        assert!(report_summary("body", ReportType::Evening).contains("4-5문장"));
    }

    #[test]
    fn test_news_digest_separates_items() {
        let prompt = news_digest(&[item("a", "s1"), item("b", "s2")]);
        assert!(prompt.starts_with("다음 2개의 최신 뉴스"));
        assert!(prompt.contains("\n\n---\n\n"));
        assert!(prompt.contains("출처: s2"));
    }
}
