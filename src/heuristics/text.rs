//! Pure text heuristics shared by every parser plugin: title/cost/duration
//! extraction, tip mining, icon lookup and noise filtering.

use regex::Regex;
use std::sync::LazyLock;

static MARKDOWN_TOKENS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*|#+|__|~~|`").expect("markdown token regex"));
static MULTI_NEWLINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n+").expect("newline regex"));
static DAY_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:Day\s*\d+|第\s*\d+\s*天)[：:]\s*([^*\n]+)").expect("day title regex")
});
static COST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:¥|￥)\s*(\d+)|(\d+)\s*元|(?i)(\d+)\s*rmb").expect("cost regex")
});
static DURATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?\s*[小时分钟]+").expect("duration regex"));
static PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[（(]([^）)]+)[）)]").expect("parenthetical regex"));
static RECOMMENDATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:推荐|建议)[：:]?\s*([^，。\n]+)").expect("recommendation regex"));
static META_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:Day\s*\d+|第\s*\d+\s*天|##\s*|预算|总计|注意|提示)").expect("meta regex")
});
static FIRST_CLAUSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^，。：:（(]+)").expect("first clause regex"));

/// Strip Markdown emphasis/heading markers and collapse repeated newlines.
pub fn clean_text(text: &str) -> String {
    let stripped = MARKDOWN_TOKENS.replace_all(text, "");
    MULTI_NEWLINE.replace_all(&stripped, "\n").trim().to_string()
}

/// Truncate a string to at most `max` characters, on a char boundary.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Extract a day-level title: a `Day N：title` header, else a short first
/// line, else the given fallback.
pub fn extract_day_title(content: &str, fallback: &str) -> String {
    if let Some(caps) = DAY_TITLE.captures(content) {
        return clean_text(&caps[1]);
    }
    if let Some(first_line) = content.lines().next() {
        let first_line = first_line.trim();
        if !first_line.is_empty() && first_line.chars().count() < 100 {
            return clean_text(first_line);
        }
    }
    fallback.to_string()
}

/// Extract an activity title: the first clause before punctuation, capped at
/// 50 characters. Very short clauses are widened to the first few tokens.
pub fn extract_activity_title(content: &str) -> String {
    let mut title = match FIRST_CLAUSE.captures(content) {
        Some(caps) => caps[1].trim().to_string(),
        None => truncate_chars(content, 30).to_string(),
    };
    title = clean_text(&title);

    if title.chars().count() < 5 {
        let words: Vec<&str> = content
            .split(|c: char| c.is_whitespace() || matches!(c, '，' | '。' | '：' | ':'))
            .filter(|w| w.chars().count() > 2)
            .take(3)
            .collect();
        if !words.is_empty() {
            title = words.join(" ");
        }
    }

    truncate_chars(&title, 50).to_string()
}

/// Pull an explicit cost (`¥120`, `120元`, `120 rmb`) out of the text.
pub fn extract_cost(text: &str) -> Option<u32> {
    let caps = COST.captures(text)?;
    caps.iter()
        .skip(1)
        .flatten()
        .next()
        .and_then(|m| m.as_str().parse().ok())
}

/// Deterministic keyword-bucketed cost estimate, used when no explicit cost
/// appears. Buckets resolve to their midpoints so repeat parses of the same
/// text agree.
pub fn estimate_cost(text: &str) -> u32 {
    if text.contains("门票") || text.contains("景点") || text.contains("景") || text.contains("参观") {
        100 // sights: 50-150
    } else if text.contains('餐') || text.contains('食') || text.contains('吃') {
        80 // food: 40-120
    } else if text.contains("交通") || text.contains("打车") || text.contains('车') || text.contains("地铁") {
        45 // transport: 20-70
    } else if text.contains("购物") || text.contains('买') {
        200 // shopping: 100-300
    } else {
        60 // default: 30-90
    }
}

/// Extract an explicit duration (`2小时`, `30分钟`) or fall back to a
/// generic estimate.
pub fn extract_duration(text: &str) -> String {
    DURATION
        .find(text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| "约2-3小时".to_string())
}

/// Mine tips from parenthetical asides and `建议/推荐:` clauses.
pub fn extract_tips(text: &str) -> Vec<String> {
    let mut tips = Vec::new();
    for caps in PARENTHETICAL.captures_iter(text) {
        let tip = caps[1].trim();
        if !tip.is_empty() && tip.chars().count() < 100 {
            tips.push(tip.to_string());
        }
    }
    if let Some(caps) = RECOMMENDATION.captures(text) {
        tips.push(caps[1].trim().to_string());
    }
    tips
}

/// Pick an emoji icon from the first matching keyword category.
pub fn activity_icon(text: &str) -> &'static str {
    let text = text.to_lowercase();
    if text.contains('餐') || text.contains('食') || text.contains('吃') {
        "🍜"
    } else if text.contains('景')
        || text.contains('游')
        || text.contains("参观")
        || text.contains("博物")
        || text.contains("文化")
        || text.contains("历史")
    {
        "🏛️"
    } else if text.contains("购物") || text.contains('买') {
        "🛍️"
    } else if text.contains("交通") || text.contains('车') || text.contains('站') {
        "🚗"
    } else if text.contains("公园") || text.contains("自然") || text.contains('山') {
        "🌳"
    } else if text.contains("娱乐") || text.contains("体验") || text.contains("活动") {
        "🎭"
    } else if text.contains("酒店") || text.contains("住宿") {
        "🏨"
    } else {
        "📍"
    }
}

/// Header/label lines that describe the itinerary rather than belong to it.
pub fn is_meta_line(line: &str) -> bool {
    META_LINE.is_match(line.trim())
}

/// Lines too short or too meta to yield an activity.
pub fn is_noise_line(line: &str) -> bool {
    let line = line.trim();
    line.chars().count() < 10 || is_meta_line(line)
}

/// Theme tags derived from a day title.
pub fn day_tags(title: &str) -> Vec<String> {
    let mut tags = Vec::new();
    if title.contains("文化") || title.contains("历史") {
        tags.push("文化古迹".to_string());
    }
    if title.contains("美食") || title.contains('餐') {
        tags.push("特色美食".to_string());
    }
    if title.contains("自然") || title.contains("公园") {
        tags.push("自然风光".to_string());
    }
    if title.contains("购物") {
        tags.push("购物体验".to_string());
    }
    if tags.is_empty() {
        tags.push("行程安排".to_string());
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_strips_markdown() {
        assert_eq!(clean_text("**上午**参观## 故宫"), "上午参观 故宫");
        assert_eq!(clean_text("line1\n\n\nline2"), "line1\nline2");
    }

    #[test]
    fn test_extract_day_title() {
        assert_eq!(extract_day_title("Day 1：初到北京\n内容", "第1天"), "初到北京");
        assert_eq!(extract_day_title("城市漫步\n别的", "第1天"), "城市漫步");
        assert_eq!(extract_day_title("", "第2天"), "第2天");
    }

    #[test]
    fn test_extract_activity_title_clause() {
        assert_eq!(extract_activity_title("参观故宫博物院，建议提前购票"), "参观故宫博物院");
        let long = "很".repeat(80);
        assert!(extract_activity_title(&long).chars().count() <= 50);
    }

    #[test]
    fn test_extract_cost_variants() {
        assert_eq!(extract_cost("门票¥60一张"), Some(60));
        assert_eq!(extract_cost("午餐约80元"), Some(80));
        assert_eq!(extract_cost("budget 45 rmb"), Some(45));
        assert_eq!(extract_cost("免费开放"), None);
    }

    #[test]
    fn test_estimate_cost_deterministic_buckets() {
        assert_eq!(estimate_cost("景点门票"), 100);
        assert_eq!(estimate_cost("品尝美食"), 80);
        assert_eq!(estimate_cost("地铁交通"), 45);
        assert_eq!(estimate_cost("购物中心"), 200);
        assert_eq!(estimate_cost("漫步老城"), 60);
        // repeat calls agree
        assert_eq!(estimate_cost("漫步老城"), estimate_cost("漫步老城"));
    }

    #[test]
    fn test_extract_duration() {
        assert_eq!(extract_duration("全程2小时"), "2小时");
        assert_eq!(extract_duration("大约30分钟即可"), "30分钟");
        assert_eq!(extract_duration("随意"), "约2-3小时");
    }

    #[test]
    fn test_extract_tips() {
        let tips = extract_tips("参观故宫（建议提前一天购票）推荐：中轴线路线");
        assert!(tips.iter().any(|t| t.contains("提前一天购票")));
        assert!(tips.iter().any(|t| t.contains("中轴线路线")));
    }

    #[test]
    fn test_activity_icon_table() {
        assert_eq!(activity_icon("品尝当地美食"), "🍜");
        assert_eq!(activity_icon("参观博物馆"), "🏛️");
        assert_eq!(activity_icon("购物街"), "🛍️");
        assert_eq!(activity_icon("地铁车站"), "🚗");
        assert_eq!(activity_icon("森林公园"), "🌳");
        assert_eq!(activity_icon("夜场体验"), "🎭");
        assert_eq!(activity_icon("入住酒店"), "🏨");
        assert_eq!(activity_icon("自由安排"), "📍");
    }

    #[test]
    fn test_noise_filtering() {
        assert!(is_meta_line("Day 1：行程"));
        assert!(is_meta_line("第2天 安排"));
        assert!(is_meta_line("预算：1000元"));
        assert!(is_noise_line("短"));
        assert!(!is_noise_line("上午参观故宫博物院并在附近午餐"));
    }

    #[test]
    fn test_day_tags_default() {
        assert_eq!(day_tags("美食之旅"), vec!["特色美食".to_string()]);
        assert_eq!(day_tags("随便走走"), vec!["行程安排".to_string()]);
    }
}
