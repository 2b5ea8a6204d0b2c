//! Markdown period-marker parser: handles itineraries written with bold
//! `**上午**`/`**下午**` section markers inside each day.

use super::plugin::ParserPlugin;
use crate::error::Result;
use crate::heuristics;
use crate::normalizer::{build_day_plan, normalize_plans};
use crate::splitter::split_days;
use crate::types::{DayPlan, ParseContext, Period, Segment};
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;

static PERIOD_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*\*\s*(上午|早上|中午|下午|傍晚|晚上|夜晚)\s*\*\*[：:]?").expect("period marker regex")
});
static BULLET_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-•*]\s+").expect("bullet prefix regex"));

#[derive(Debug, Default)]
pub struct MarkdownPeriodPlugin;

impl MarkdownPeriodPlugin {
    pub const NAME: &'static str = "MarkdownPeriodPlugin";

    pub fn new() -> Self {
        Self
    }

    /// Parse one day's chunk into segments keyed by its period markers.
    fn parse_day_chunk(chunk: &str) -> Vec<Segment> {
        let markers: Vec<(usize, usize, Period)> = PERIOD_MARKER
            .captures_iter(chunk)
            .map(|caps| {
                let whole = caps.get(0).expect("marker match");
                (whole.start(), whole.end(), Period::from_loose(&caps[1]))
            })
            .collect();

        let mut segments = Vec::new();
        for (index, (_, body_start, period)) in markers.iter().enumerate() {
            let body_end = markers
                .get(index + 1)
                .map(|(start, _, _)| *start)
                .unwrap_or(chunk.len());
            let body = &chunk[*body_start..body_end];

            let mut activities = Vec::new();
            for line in body.lines() {
                let line = BULLET_PREFIX.replace(line.trim(), "");
                if line.is_empty() || heuristics::is_meta_line(&line) {
                    continue;
                }
                if let Some(activity) = super::activity_from_text(&line) {
                    activities.push(activity);
                }
            }
            // marker followed by inline prose only
            if activities.is_empty() {
                if let Some(activity) = super::activity_from_text(body) {
                    activities.push(activity);
                }
            }
            if !activities.is_empty() {
                segments.push(Segment {
                    period: *period,
                    time: period.time_range().to_string(),
                    activities,
                });
            }
        }
        segments
    }
}

#[async_trait]
impl ParserPlugin for MarkdownPeriodPlugin {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn priority(&self) -> i32 {
        80
    }

    fn can_handle(&self, raw: &str) -> bool {
        PERIOD_MARKER.is_match(raw)
    }

    async fn try_parse(&self, raw: &str, context: &ParseContext) -> Result<Option<Vec<DayPlan>>> {
        let mut plans = Vec::new();
        for (index, chunk) in split_days(raw, context.total_days).iter().enumerate() {
            let day_number = index as u32 + 1;
            let segments = Self::parse_day_chunk(chunk);
            if segments.is_empty() {
                continue;
            }
            let title = heuristics::extract_day_title(chunk, &format!("第{}天", day_number));
            plans.push(build_day_plan(day_number, title, segments, context));
        }
        let plans = normalize_plans(plans);
        Ok((!plans.is_empty()).then_some(plans))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Day 1：经典一日\n**上午**\n- 参观故宫博物院，门票¥60\n- 漫步景山公园俯瞰紫禁城\n**下午**：逛南锣鼓巷感受胡同文化\n**晚上**\n- 品尝全聚德烤鸭，人均120元\n\nDay 2：现代北京\n**上午**\n- 参观国家博物馆的常设展览";

    #[tokio::test]
    async fn test_parses_period_markers() {
        let plugin = MarkdownPeriodPlugin::new();
        assert!(plugin.can_handle(SAMPLE));
        let context = ParseContext::new("北京", 2);
        let plans = plugin.try_parse(SAMPLE, &context).await.unwrap().unwrap();
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].segments.len(), 3);
        assert_eq!(plans[0].segments[0].period, Period::Morning);
        assert_eq!(plans[0].segments[0].activities.len(), 2);
        assert_eq!(plans[0].segments[0].activities[0].cost, Some(60));
        // inline prose after a marker still becomes an activity
        assert_eq!(plans[0].segments[1].activities.len(), 1);
    }

    #[tokio::test]
    async fn test_rejects_plain_prose() {
        let plugin = MarkdownPeriodPlugin::new();
        assert!(!plugin.can_handle("没有任何标记的行程描述"));
        let context = ParseContext::new("北京", 1);
        let result = plugin.try_parse("**上午**\n短", &context).await.unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_marker_period_mapping() {
        let segments = MarkdownPeriodPlugin::parse_day_chunk(
            "**中午**\n- 午餐吃本帮菜人均80元\n**夜晚**\n- 外滩夜景散步拍照留念",
        );
        assert_eq!(segments[0].period, Period::Noon);
        assert_eq!(segments[1].period, Period::Night);
    }
}
