//! Time-range parser: itineraries keyed by explicit clock ranges such as
//! `09:00-11:30 参观...`.

use super::plugin::ParserPlugin;
use crate::error::Result;
use crate::heuristics;
use crate::normalizer::{build_day_plan, normalize_plans};
use crate::splitter::split_days;
use crate::types::{DayPlan, ParseContext, Period, Segment};
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;

static TIME_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,2})[:：](\d{2})\s*[-~—]\s*(\d{1,2})[:：](\d{2})").expect("time range regex")
});

#[derive(Debug, Default)]
pub struct TimeRangePlugin;

impl TimeRangePlugin {
    pub const NAME: &'static str = "TimeRangePlugin";

    pub fn new() -> Self {
        Self
    }

    fn parse_day_chunk(chunk: &str) -> Vec<Segment> {
        let matches: Vec<(usize, usize, String, u32)> = TIME_RANGE
            .captures_iter(chunk)
            .map(|caps| {
                let whole = caps.get(0).expect("range match");
                let start_hour: u32 = caps[1].parse().unwrap_or(9);
                let time = format!(
                    "{:02}:{}-{:02}:{}",
                    start_hour,
                    &caps[2],
                    caps[3].parse::<u32>().unwrap_or(12),
                    &caps[4]
                );
                (whole.start(), whole.end(), time, start_hour)
            })
            .collect();

        let mut segments: Vec<Segment> = Vec::new();
        for (index, (_, text_start, time, start_hour)) in matches.iter().enumerate() {
            let text_end = matches
                .get(index + 1)
                .map(|(start, _, _, _)| *start)
                .unwrap_or(chunk.len());
            let Some(activity) = super::activity_from_text(&chunk[*text_start..text_end]) else {
                continue;
            };
            let period = Period::from_hour(*start_hour);
            // consecutive entries in the same period share a segment; the
            // segment keeps the first entry's range
            match segments.last_mut() {
                Some(last) if last.period == period => last.activities.push(activity),
                _ => segments.push(Segment {
                    period,
                    time: time.clone(),
                    activities: vec![activity],
                }),
            }
        }
        segments
    }
}

#[async_trait]
impl ParserPlugin for TimeRangePlugin {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn priority(&self) -> i32 {
        60
    }

    fn can_handle(&self, raw: &str) -> bool {
        TIME_RANGE.is_match(raw)
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
