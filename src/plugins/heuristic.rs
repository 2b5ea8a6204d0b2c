//! Last-resort heuristic parser. Accepts any reasonably long text and
//! scans it line by line, carrying the most recent period keyword forward.
//! Winning with this plugin is a signal the input had no recognizable
//! structure, so the orchestrator attaches a warning.

use super::plugin::ParserPlugin;
use crate::error::Result;
use crate::heuristics;
use crate::normalizer::{build_day_plan, normalize_plans};
use crate::splitter::split_days;
use crate::types::{DayPlan, ParseContext, Period, Segment};
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;

static BULLET_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-•*]\s+|^\d+\s*[、.]\s*").expect("bullet prefix regex"));

#[derive(Debug, Default)]
pub struct HeuristicPlugin;

impl HeuristicPlugin {
    pub const NAME: &'static str = "HeuristicPlugin";

    pub fn new() -> Self {
        Self
    }

    fn parse_day_chunk(chunk: &str) -> Vec<Segment> {
        let mut segments: Vec<Segment> = Vec::new();
        let mut current = Period::Morning;

        for line in chunk.lines() {
            let line = BULLET_PREFIX.replace(heuristics::clean_text(line).trim(), "").to_string();
            if let Some(period) = heuristics::find_period_keyword(&line) {
                current = period;
            }
            if heuristics::is_noise_line(&line) {
                continue;
            }
            let Some(activity) = super::activity_from_text(&line) else {
                continue;
            };
            match segments.iter_mut().find(|s| s.period == current) {
                Some(segment) => segment.activities.push(activity),
                None => segments.push(Segment {
                    period: current,
                    time: current.time_range().to_string(),
                    activities: vec![activity],
                }),
            }
        }

        // no usable lines: treat the whole chunk as one morning block
        if segments.is_empty() {
            if let Some(activity) = super::activity_from_text(chunk) {
                segments.push(Segment {
                    period: Period::Morning,
                    time: Period::Morning.time_range().to_string(),
                    activities: vec![activity],
                });
            }
        }
        segments
    }
}

#[async_trait]
impl ParserPlugin for HeuristicPlugin {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn priority(&self) -> i32 {
        10
    }

    fn can_handle(&self, raw: &str) -> bool {
        raw.trim().chars().count() > 50
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
