//! Numbered-list parser: `1. **早餐**：...` style itineraries where each
//! day is a short ordered list of labeled items.

use super::plugin::ParserPlugin;
use crate::error::Result;
use crate::heuristics;
use crate::normalizer::{build_day_plan, normalize_plans};
use crate::splitter::split_days;
use crate::types::{DayPlan, ParseContext, Period, Segment};
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;

static NUMBERED_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(\d+)\s*[、.]\s*\*\*([^*\n]+)\*\*[：:]?\s*").expect("numbered item regex")
});

#[derive(Debug, Default)]
pub struct NumberedListPlugin;

struct Item {
    number: u32,
    label: String,
    body: String,
}

impl NumberedListPlugin {
    pub const NAME: &'static str = "NumberedListPlugin";

    pub fn new() -> Self {
        Self
    }

    /// Collect the numbered items of one day chunk; each item's body runs to
    /// the start of the next item.
    fn collect_items(chunk: &str) -> Vec<Item> {
        let matches: Vec<(usize, usize, u32, String)> = NUMBERED_ITEM
            .captures_iter(chunk)
            .map(|caps| {
                let whole = caps.get(0).expect("item match");
                let number = caps[1].parse().unwrap_or(0);
                (whole.start(), whole.end(), number, caps[2].trim().to_string())
            })
            .collect();

        matches
            .iter()
            .enumerate()
            .map(|(index, (_, body_start, number, label))| {
                let body_end = matches
                    .get(index + 1)
                    .map(|(start, _, _, _)| *start)
                    .unwrap_or(chunk.len());
                Item {
                    number: *number,
                    label: label.clone(),
                    body: chunk[*body_start..body_end].trim().to_string(),
                }
            })
            .collect()
    }

    fn parse_day_chunk(chunk: &str) -> Vec<Segment> {
        let mut segments: Vec<Segment> = Vec::new();
        for item in Self::collect_items(chunk) {
            let period = heuristics::period_from_label(&item.label, item.number);
            let source = if item.body.is_empty() {
                item.label.clone()
            } else if heuristics::is_time_period_label(&item.label) {
                item.body.clone()
            } else {
                format!("{}，{}", item.label, item.body)
            };
            let Some(mut activity) = super::activity_from_text(&source) else {
                continue;
            };
            // a concrete label is a better title than the first clause
            if !heuristics::is_time_period_label(&item.label) {
                activity.title = heuristics::truncate_chars(&item.label, 50).to_string();
            }
            match segments.iter_mut().find(|s| s.period == period) {
                Some(segment) => segment.activities.push(activity),
                None => segments.push(Segment {
                    period,
                    time: period.time_range().to_string(),
                    activities: vec![activity],
                }),
            }
        }
        segments
    }
}

#[async_trait]
impl ParserPlugin for NumberedListPlugin {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn priority(&self) -> i32 {
        70
    }

    fn can_handle(&self, raw: &str) -> bool {
        NUMBERED_ITEM.is_match(raw)
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

    const SAMPLE: &str = "第1天：古都精华\n1. **早餐**：在护国寺小吃街品尝豆汁焦圈\n2. **故宫博物院**：沿中轴线参观三大殿，门票¥60\n3. **午餐**：故宫角楼餐厅用餐人均100元\n4. **景山公园**：登顶俯瞰紫禁城全景\n5. **晚上**：什刹海酒吧街听现场音乐";

    #[tokio::test]
    async fn test_parses_numbered_items() {
        let plugin = NumberedListPlugin::new();
        assert!(plugin.can_handle(SAMPLE));
        let context = ParseContext::new("北京", 1);
        let plans = plugin.try_parse(SAMPLE, &context).await.unwrap().unwrap();
        assert_eq!(plans.len(), 1);
        let day = &plans[0];
        // 早餐 morning, 故宫 morning (#2), 午餐 noon, 景山 afternoon (#4), 晚上 night
        assert_eq!(day.segments.len(), 4);
        assert_eq!(day.segments[0].period, Period::Morning);
        assert_eq!(day.segments[0].activities.len(), 2);
        assert_eq!(day.segments[0].activities[1].title, "故宫博物院");
        assert_eq!(day.segments[0].activities[1].cost, Some(60));
    }

    #[tokio::test]
    async fn test_period_label_wins_over_index() {
        let plugin = NumberedListPlugin::new();
        let context = ParseContext::new("上海", 1);
        let raw = "1. **晚餐**：外滩餐厅享用本帮菜人均150元";
        let plans = plugin.try_parse(raw, &context).await.unwrap().unwrap();
        assert_eq!(plans[0].segments[0].period, Period::Evening);
    }

    #[tokio::test]
    async fn test_rejects_unnumbered_text() {
        let plugin = NumberedListPlugin::new();
        assert!(!plugin.can_handle("**上午**随便逛逛没有编号"));
    }

    #[test]
    fn test_collect_items_bodies() {
        let items = NumberedListPlugin::collect_items(SAMPLE);
        assert_eq!(items.len(), 5);
        assert_eq!(items[1].label, "故宫博物院");
        assert!(items[1].body.contains("三大殿"));
        assert!(!items[1].body.contains("午餐"));
    }
}
