//! Period-keyword inference, clock-time normalization and day-date labels.

use crate::types::Period;
use chrono::{Duration, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

static TIME_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,2}:\d{2}-\d{1,2}:\d{2}$").expect("time range regex"));
static SINGLE_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2}):(\d{2})").expect("single time regex"));

/// Keyword table scanned line-by-line by the heuristic plugin.
const PERIOD_KEYWORDS: [(&[&str], Period); 5] = [
    (&["早", "上午", "morning"], Period::Morning),
    (&["中午", "午餐", "noon"], Period::Noon),
    (&["下午", "afternoon"], Period::Afternoon),
    (&["傍晚", "晚餐", "evening"], Period::Evening),
    (&["夜", "晚上", "night"], Period::Night),
];

/// Scan a line for the first period keyword it mentions.
pub fn find_period_keyword(line: &str) -> Option<Period> {
    for (keywords, period) in PERIOD_KEYWORDS {
        if keywords.iter().any(|k| line.contains(k)) {
            return Some(period);
        }
    }
    None
}

/// Infer a period for a numbered-list item: label keywords win, otherwise
/// the item index decides (items 1-2 morning, 3-4 afternoon, rest evening).
pub fn period_from_label(label: &str, item_number: u32) -> Period {
    if label.contains("早餐") || label.contains("上午") || label.contains("早上") {
        return Period::Morning;
    }
    if label.contains("午餐") || label.contains("中午") {
        return Period::Noon;
    }
    if label.contains("下午") {
        return Period::Afternoon;
    }
    if label.contains("晚餐") || label.contains("傍晚") {
        return Period::Evening;
    }
    if label.contains("晚上") || label.contains('夜') {
        return Period::Night;
    }
    if item_number <= 2 {
        Period::Morning
    } else if item_number <= 4 {
        Period::Afternoon
    } else {
        Period::Evening
    }
}

/// Labels that denote a meal/time slot rather than a concrete activity.
pub fn is_time_period_label(label: &str) -> bool {
    ["早餐", "午餐", "晚餐", "上午", "下午", "晚上", "傍晚", "中午", "早上"]
        .iter()
        .any(|p| label.contains(p))
}

/// Coerce a loose time string into `HH:MM-HH:MM`. A bare `HH:MM` gets a
/// three-hour window; anything unparseable falls back to the morning range.
pub fn normalize_time(time: &str) -> String {
    let time = time.trim().replace(['点', '时'], ":").replace('~', "-");
    if TIME_RANGE.is_match(&time) {
        return time;
    }
    if let Some(caps) = SINGLE_TIME.captures(&time) {
        let hour: u32 = caps[1].parse().unwrap_or(9);
        let minute = &caps[2];
        let end_hour = (hour + 3).min(23);
        return format!("{:02}:{}-{:02}:{}", hour, minute, end_hour, minute);
    }
    Period::Morning.time_range().to_string()
}

/// Starting hour of an `HH:MM-HH:MM` range, when parseable.
pub fn start_hour(time: &str) -> Option<u32> {
    let caps = SINGLE_TIME.captures(time)?;
    caps[1].parse().ok()
}

/// Human-readable date label for day `offset` (0-based) after `start_date`.
/// Without a parseable start date the label stays relative, keeping repeat
/// parses of the same input identical.
pub fn calculate_day_date(start_date: Option<&str>, offset: u32) -> String {
    if let Some(raw) = start_date {
        if let Ok(date) = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
            let date = date + Duration::days(offset as i64);
            const WEEKDAYS: [&str; 7] = ["周一", "周二", "周三", "周四", "周五", "周六", "周日"];
            use chrono::Datelike;
            return format!(
                "{}月{}日 {}",
                date.month(),
                date.day(),
                WEEKDAYS[date.weekday().num_days_from_monday() as usize]
            );
        }
    }
    format!("第{}天", offset + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_period_keyword() {
        assert_eq!(find_period_keyword("上午参观故宫"), Some(Period::Morning));
        assert_eq!(find_period_keyword("晚餐吃烤鸭"), Some(Period::Evening));
        assert_eq!(find_period_keyword("夜游什刹海"), Some(Period::Night));
        assert_eq!(find_period_keyword("随意逛逛"), None);
    }

    #[test]
    fn test_period_from_label_index_fallback() {
        assert_eq!(period_from_label("午餐", 5), Period::Noon);
        assert_eq!(period_from_label("天坛", 1), Period::Morning);
        assert_eq!(period_from_label("胡同游", 3), Period::Afternoon);
        assert_eq!(period_from_label("杂技表演", 5), Period::Evening);
    }

    #[test]
    fn test_normalize_time() {
        assert_eq!(normalize_time("09:00-12:00"), "09:00-12:00");
        assert_eq!(normalize_time("9:30"), "09:30-12:30");
        assert_eq!(normalize_time("14:00~17:00"), "14:00-17:00");
        assert_eq!(normalize_time("下午晚些"), "09:00-12:00");
        assert_eq!(normalize_time("22:00"), "22:00-23:00");
    }

    #[test]
    fn test_start_hour() {
        assert_eq!(start_hour("09:00-12:00"), Some(9));
        assert_eq!(start_hour("19:30-21:00"), Some(19));
        assert_eq!(start_hour("all day"), None);
    }

    #[test]
    fn test_calculate_day_date() {
        assert_eq!(calculate_day_date(Some("2025-03-03"), 0), "3月3日 周一");
        assert_eq!(calculate_day_date(Some("2025-03-03"), 2), "3月5日 周三");
        assert_eq!(calculate_day_date(None, 1), "第2天");
        assert_eq!(calculate_day_date(Some("not a date"), 0), "第1天");
    }
}
