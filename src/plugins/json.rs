//! JSON-structured parser plugin. Highest priority: when the LLM honored
//! the structured-output instructions this plugin wins and the result is
//! flagged as a structured hit.

use super::plugin::{default_score, ParserPlugin};
use crate::error::Result;
use crate::normalizer::normalize_llm_output;
use crate::types::{DayPlan, ParseContext};
use async_trait::async_trait;
use regex::Regex;
use serde_json::{json, Value};
use std::sync::LazyLock;
use tracing::debug;

static FENCED_JSON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)```(?:json)?\s*\n?(.*?)\n?```").expect("fenced json regex")
});
static DAY_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:day\d+|第\d+天)$").expect("day key regex"));

/// Numeric suffix of a `dayN` / `第N天` key.
fn day_key_number(key: &str) -> u32 {
    key.chars()
        .filter(|c| c.is_ascii_digit())
        .collect::<String>()
        .parse()
        .unwrap_or(0)
}

#[derive(Debug, Default)]
pub struct JsonPlugin;

impl JsonPlugin {
    pub const NAME: &'static str = "JsonPlugin";

    pub fn new() -> Self {
        Self
    }

    /// Pull a JSON value out of raw LLM output: direct parse, fenced code
    /// block, or the outermost brace span.
    fn extract_json(raw: &str) -> Option<Value> {
        if let Ok(value) = serde_json::from_str(raw.trim()) {
            return Some(value);
        }
        if let Some(caps) = FENCED_JSON.captures(raw) {
            if let Ok(value) = serde_json::from_str(caps[1].trim()) {
                return Some(value);
            }
        }
        let start = raw.find('{')?;
        let end = raw.rfind('}')?;
        if end > start {
            serde_json::from_str(&raw[start..=end]).ok()
        } else {
            None
        }
    }

    /// Repair common structural deviations before giving up: a bare days
    /// array, `day1`/`第1天` keys instead of a `days` list, or per-period
    /// fields (`morning`/`afternoon`/`evening`) instead of segments.
    fn repair_structure(data: &Value) -> Option<Value> {
        // bare array of day objects
        if let Value::Array(items) = data {
            if items.first().map(|d| d.get("day").is_some()).unwrap_or(false) {
                return Some(json!({ "days": items }));
            }
            return None;
        }

        let obj = data.as_object()?;

        if !obj.contains_key("days") {
            let mut day_entries: Vec<(&String, &Value)> = obj
                .iter()
                .filter(|(key, _)| DAY_KEY.is_match(&key.to_lowercase()))
                .collect();
            if day_entries.is_empty() {
                return None;
            }
            // numeric order, so day10 sorts after day2
            day_entries.sort_by_key(|(key, _)| day_key_number(key));
            let days: Vec<Value> = day_entries
                .iter()
                .enumerate()
                .map(|(index, (_, value))| {
                    json!({
                        "day": index + 1,
                        "title": value.get("title").cloned().unwrap_or(Value::Null),
                        "segments": value.get("segments").cloned().unwrap_or_else(|| json!([])),
                    })
                })
                .collect();
            return Some(json!({ "days": days }));
        }

        // days present but some entries carry per-period fields
        let days = obj.get("days")?.as_array()?;
        let repaired: Vec<Value> = days
            .iter()
            .map(|day| {
                let has_segments = day
                    .get("segments")
                    .and_then(Value::as_array)
                    .map(|s| !s.is_empty())
                    .unwrap_or(false);
                if has_segments {
                    return day.clone();
                }
                let mut segments = Vec::new();
                for (field, period, time) in [
                    ("morning", "morning", "09:00-12:00"),
                    ("afternoon", "afternoon", "14:00-17:00"),
                    ("evening", "evening", "18:00-21:00"),
                ] {
                    if let Some(entry) = day.get(field) {
                        let activities = match entry {
                            Value::Array(items) => items.clone(),
                            Value::String(text) => {
                                vec![json!({ "title": text, "description": text })]
                            }
                            _ => continue,
                        };
                        segments.push(json!({
                            "period": period,
                            "time": time,
                            "activities": activities,
                        }));
                    }
                }
                let mut repaired_day = day.clone();
                if let Some(obj) = repaired_day.as_object_mut() {
                    obj.insert("segments".to_string(), Value::Array(segments));
                }
                repaired_day
            })
            .collect();
        Some(json!({ "days": repaired }))
    }
}

#[async_trait]
impl ParserPlugin for JsonPlugin {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn priority(&self) -> i32 {
        100
    }

    fn can_handle(&self, raw: &str) -> bool {
        raw.contains('{')
            && raw.contains('}')
            && (raw.contains("\"days\"") || raw.contains("\"day\"") || raw.contains("```json"))
    }

    async fn try_parse(&self, raw: &str, context: &ParseContext) -> Result<Option<Vec<DayPlan>>> {
        let Some(value) = Self::extract_json(raw) else {
            debug!(target: "timeline::plugin", plugin = Self::NAME, "no JSON payload found");
            return Ok(None);
        };

        match normalize_llm_output(&value, context) {
            Ok(plans) => Ok(Some(plans)),
            Err(err) => {
                debug!(
                    target: "timeline::plugin",
                    plugin = Self::NAME,
                    error = %err,
                    "direct normalization failed, attempting repair"
                );
                let Some(repaired) = Self::repair_structure(&value) else {
                    return Ok(None);
                };
                match normalize_llm_output(&repaired, context) {
                    Ok(plans) => Ok(Some(plans)),
                    Err(_) => Ok(None),
                }
            }
        }
    }

    /// JSON results get a flat bonus: the structured path is the most
    /// trustworthy source when it validates.
    fn score(&self, result: &[DayPlan]) -> u32 {
        default_score(result) + 50
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(days: u32) -> ParseContext {
        ParseContext::new("上海", days)
    }

    #[tokio::test]
    async fn test_parses_fenced_json_block() {
        let raw = r#"好的，这是行程：
```json
{"days":[{"day":1,"title":"外滩","segments":[{"period":"morning","time":"09:00-12:00",
"activities":[{"title":"外滩漫步","description":"沿黄浦江欣赏万国建筑群","cost":0}]}]}]}
```"#;
        let plugin = JsonPlugin::new();
        assert!(plugin.can_handle(raw));
        let plans = plugin.try_parse(raw, &ctx(1)).await.unwrap().unwrap();
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].segments[0].activities[0].title, "外滩漫步");
    }

    #[tokio::test]
    async fn test_repairs_bare_day_array() {
        let raw = r#"[{"day":1,"title":"第一天","segments":[{"period":"morning",
"activities":[{"title":"晨跑","description":"滨江步道晨跑呼吸新鲜空气"}]}]}]"#;
        let plugin = JsonPlugin::new();
        let plans = plugin.try_parse(raw, &ctx(1)).await.unwrap().unwrap();
        assert_eq!(plans.len(), 1);
    }

    #[tokio::test]
    async fn test_repairs_period_fields() {
        let raw = r#"{"days":[{"day":1,"title":"紧凑的一天",
"morning":"参观博物馆看展览","evening":"夜游黄浦江"}]}"#;
        let plugin = JsonPlugin::new();
        let plans = plugin.try_parse(raw, &ctx(1)).await.unwrap().unwrap();
        assert_eq!(plans[0].segments.len(), 2);
    }

    #[tokio::test]
    async fn test_repaired_day_keys_sort_numerically() {
        let mut raw = String::from("{");
        for n in [2, 10, 1] {
            raw.push_str(&format!(
                r#""day{}":{{"title":"第{}站","segments":[{{"period":"morning",
"activities":[{{"title":"活动{}","description":"内容足够长的活动描述文字"}}]}}]}},"#,
                n, n, n
            ));
        }
        raw.pop();
        raw.push('}');

        let plugin = JsonPlugin::new();
        let plans = plugin.try_parse(&raw, &ctx(3)).await.unwrap().unwrap();
        assert_eq!(plans.len(), 3);
        assert_eq!(plans[0].title, "第1站");
        assert_eq!(plans[1].title, "第2站");
        assert_eq!(plans[2].title, "第10站");
    }

    #[tokio::test]
    async fn test_rejects_garbage() {
        let plugin = JsonPlugin::new();
        assert!(!plugin.can_handle("纯文本行程，没有结构化内容"));
        let result = plugin
            .try_parse("{\"day\": not valid json", &ctx(1))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_score_bonus() {
        let plugin = JsonPlugin::new();
        assert_eq!(plugin.score(&[]), 50);
    }
}
