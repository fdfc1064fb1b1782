//! Body cleaning and keyword tagging for collected feed entries

use scraper::Html;

/// Stored bodies are cut to this many characters
pub const MAX_CONTENT_CHARS: usize = 2000;

/// Bodies shorter than this are prefixed with the title
pub const MIN_CONTENT_CHARS: usize = 50;

/// Investment keywords matched case-insensitively against title and body
pub const INVESTMENT_KEYWORDS: &[&str] = &[
    // Equities
    "주식", "stock", "equity", "상장", "IPO", "배당", "dividend",
    // Bonds
    "채권", "bond", "국채", "회사채", "수익률", "yield",
    // Currencies
    "달러", "유로", "엔화", "원화", "위안", "환율", "currency", "exchange rate",
    // Rates
    "금리", "interest rate", "기준금리", "base rate", "연준", "Fed", "ECB", "한국은행",
    // Macro indicators
    "인플레이션", "inflation", "CPI", "GDP", "고용", "employment", "실업률",
    // Regions
    "미국", "중국", "유럽", "일본", "한국", "아시아", "신흥국",
    // Sectors
    "기술주", "tech", "금융주", "financial", "에너지", "energy", "헬스케어", "healthcare",
    "부동산", "real estate", "소비재", "consumer", "산업재", "industrial",
    // Commodities
    "금", "gold", "은", "silver", "구리", "copper", "석유", "oil", "가스", "gas",
    // Crypto
    "비트코인", "bitcoin", "이더리움", "ethereum", "암호화폐", "crypto",
    // Portfolio
    "펀드", "fund", "ETF", "포트폴리오", "portfolio", "리스크", "risk",
];

/// Text content of an HTML fragment with entities decoded. A `<` that does
/// not open a tag stays in the text.
fn strip_html(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    fragment.root_element().text().collect()
}

/// Collapse every run of whitespace into a single space
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove markup from a feed body and normalize whitespace
pub fn clean_content(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    clean_text(&strip_html(raw))
}

/// Produce the stored body for an entry: cleaned, padded with the title when
/// short, and truncated to [`MAX_CONTENT_CHARS`] characters.
pub fn prepare_content(title: &str, raw_body: &str) -> String {
    let mut content = clean_content(raw_body);

    if content.chars().count() < MIN_CONTENT_CHARS {
        content = format!("{}. {}", title, content);
    }

    truncate_chars(&content, MAX_CONTENT_CHARS)
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Keyword matches in `text` followed by `category`, without duplicates
pub fn extract_tags(text: &str, category: &str) -> Vec<String> {
    let haystack = text.to_lowercase();

    let mut tags: Vec<String> = Vec::new();
    let matches = INVESTMENT_KEYWORDS
        .iter()
        .filter(|keyword| haystack.contains(&keyword.to_lowercase()))
        .map(|keyword| keyword.to_string())
        .chain(std::iter::once(category.to_string()));

    for tag in matches {
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}
