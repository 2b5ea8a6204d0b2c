//! Normalization layer: maps the loosely-typed shapes produced by the
//! parser plugins onto the canonical [`DayPlan`] model, and flattens the
//! canonical model into the legacy per-activity format for non-migrated
//! consumers. All functions are pure; the canonical pass is idempotent.

use crate::error::{ParseError, Result};
use crate::heuristics;
use crate::types::{
    Activity, DayPlan, LegacyDayActivity, LegacyTimelineItem, ParseContext, Period, Segment,
    Weather,
};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::LazyLock;

static DAY_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:Day\s*\d+|第\s*\d+\s*天)[：:]\s*").expect("day prefix regex")
});
static NUMBERED_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s*[^：:]*[：:]\s*").expect("numbered prefix regex"));

/// Loosely-typed shape the JSON plugin expects from an LLM.
#[derive(Debug, Deserialize)]
pub struct LlmItinerary {
    pub days: Vec<LlmDay>,
}

#[derive(Debug, Deserialize)]
pub struct LlmDay {
    #[serde(default)]
    pub day: Option<u32>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub segments: Vec<LlmSegment>,
}

#[derive(Debug, Deserialize)]
pub struct LlmSegment {
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub activities: Vec<LlmActivity>,
}

#[derive(Debug, Deserialize)]
pub struct LlmActivity {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "desc")]
    pub description: Option<String>,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub tips: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

/// Deserialize and normalize a structured LLM payload into canonical plans.
/// Deserialization goes through `serde_path_to_error` so failures name the
/// offending path.
pub fn normalize_llm_output(payload: &Value, context: &ParseContext) -> Result<Vec<DayPlan>> {
    let raw = payload.to_string();
    let mut deserializer = serde_json::Deserializer::from_str(&raw);
    let itinerary: LlmItinerary =
        serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
            let path = err.path().to_string();
            let location = if path.is_empty() { "<root>".to_string() } else { path };
            ParseError::Validation(format!(
                "failed to deserialize LLM itinerary at {}: {}",
                location, err
            ))
        })?;

    if itinerary.days.is_empty() {
        return Err(ParseError::Validation(
            "LLM itinerary contains no days".to_string(),
        ));
    }

    let plans = itinerary
        .days
        .into_iter()
        .enumerate()
        .map(|(index, day)| {
            // The source's own numbering may be sparse; position decides.
            let day_number = index as u32 + 1;
            let title = match day.title.as_deref() {
                Some(t) if !t.trim().is_empty() => sanitize_title(t),
                _ => format!("第{}天", day_number),
            };
            let segments = day
                .segments
                .into_iter()
                .filter_map(normalize_llm_segment)
                .collect::<Vec<_>>();
            build_day_plan(day_number, title, segments, context)
        })
        .collect();

    let plans = normalize_plans(plans);
    if plans.is_empty() {
        return Err(ParseError::Validation(
            "no usable days after normalization".to_string(),
        ));
    }
    Ok(plans)
}

fn normalize_llm_segment(segment: LlmSegment) -> Option<Segment> {
    let period = Period::from_loose(segment.period.as_deref().unwrap_or(""));
    let time = segment
        .time
        .as_deref()
        .map(heuristics::normalize_time)
        .unwrap_or_else(|| period.time_range().to_string());
    let activities: Vec<Activity> = segment
        .activities
        .into_iter()
        .filter_map(|a| normalize_llm_activity(a))
        .collect();
    if activities.is_empty() {
        return None;
    }
    Some(Segment {
        period,
        time,
        activities,
    })
}

fn normalize_llm_activity(activity: LlmActivity) -> Option<Activity> {
    let title = sanitize_title(activity.title.as_deref().unwrap_or(""));
    let description = activity.description.unwrap_or_default();
    if title.is_empty() && description.is_empty() {
        return None;
    }
    let title = if title.is_empty() {
        heuristics::extract_activity_title(&description)
    } else {
        heuristics::truncate_chars(&title, 50).to_string()
    };
    let cost = activity
        .cost
        .filter(|c| c.is_finite() && *c >= 0.0)
        .map(|c| c as u32);
    let icon = activity
        .icon
        .filter(|i| !i.trim().is_empty())
        .unwrap_or_else(|| heuristics::activity_icon(&format!("{} {}", title, description)).to_string());
    Some(Activity {
        duration: activity
            .duration
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| "约2-3小时".to_string()),
        tips: activity.tips,
        location: activity.location,
        icon,
        cost,
        title,
        description,
    })
}

/// Strip Markdown emphasis, day prefixes and list numbering from a title
/// and clamp its length. Applying it twice is a no-op.
pub fn sanitize_title(title: &str) -> String {
    let cleaned = heuristics::clean_text(title);
    let cleaned = DAY_PREFIX.replace(&cleaned, "");
    let cleaned = NUMBERED_PREFIX.replace(&cleaned, "");
    heuristics::truncate_chars(cleaned.trim(), 60).to_string()
}

/// Assemble one canonical day from parsed segments, deriving the fields the
/// source text cannot supply (date label, weather placeholder, totals,
/// progress, tags).
pub fn build_day_plan(
    day_number: u32,
    title: String,
    segments: Vec<Segment>,
    context: &ParseContext,
) -> DayPlan {
    let total_cost = DayPlan::derive_total_cost(&segments);
    let tags = heuristics::day_tags(&title);
    DayPlan {
        date: heuristics::calculate_day_date(context.start_date.as_deref(), day_number.saturating_sub(1)),
        weather: Some(Weather::placeholder(day_number)),
        location: context.destination.clone(),
        progress: DayPlan::derive_progress(day_number),
        image: String::new(),
        day: day_number,
        title,
        segments,
        total_cost,
        tags,
    }
}

/// Canonicalize a set of plans: drop empty segments/days, renumber days to
/// a contiguous 1..N, sanitize titles, coerce times, refresh derived
/// fields. Normalizing already-canonical data is a no-op.
pub fn normalize_plans(plans: Vec<DayPlan>) -> Vec<DayPlan> {
    let mut out: Vec<DayPlan> = Vec::with_capacity(plans.len());
    for mut plan in plans {
        plan.segments.retain(|s| !s.activities.is_empty());
        if plan.segments.is_empty() {
            continue;
        }
        for segment in &mut plan.segments {
            segment.time = heuristics::normalize_time(&segment.time);
            for activity in &mut segment.activities {
                activity.title = heuristics::truncate_chars(&sanitize_title(&activity.title), 50)
                    .to_string();
                if activity.icon.trim().is_empty() {
                    activity.icon = heuristics::activity_icon(&activity.description).to_string();
                }
            }
        }
        let day_number = out.len() as u32 + 1;
        plan.day = day_number;
        plan.title = sanitize_title(&plan.title);
        if plan.title.is_empty() {
            plan.title = format!("第{}天", day_number);
        }
        plan.total_cost = DayPlan::derive_total_cost(&plan.segments);
        plan.progress = DayPlan::derive_progress(day_number);
        if plan.weather.is_none() {
            plan.weather = Some(Weather::placeholder(day_number));
        }
        if plan.tags.is_empty() {
            plan.tags = heuristics::day_tags(&plan.title);
        }
        out.push(plan);
    }
    out
}

/// Flatten canonical plans into the legacy per-activity array.
pub fn convert_to_legacy(plans: &[DayPlan]) -> Vec<LegacyDayActivity> {
    plans
        .iter()
        .map(|day| LegacyDayActivity {
            day: day.day,
            title: day.title.clone(),
            date: day.date.clone(),
            weather: day
                .weather
                .as_ref()
                .map(|w| w.condition.clone())
                .unwrap_or_else(|| "晴朗".to_string()),
            temperature: day
                .weather
                .as_ref()
                .map(|w| w.temperature.clone())
                .unwrap_or_else(|| "25°C".to_string()),
            location: day.location.clone(),
            cost: day.total_cost,
            progress: day.progress,
            image: day.image.clone(),
            tags: day.tags.clone(),
            timeline: day
                .segments
                .iter()
                .flat_map(|segment| {
                    segment.activities.iter().map(|activity| LegacyTimelineItem {
                        time: segment.time.clone(),
                        period: segment.period.as_str().to_string(),
                        title: activity.title.clone(),
                        description: activity.description.clone(),
                        icon: activity.icon.clone(),
                        cost: activity.cost.unwrap_or(0),
                        duration: activity.duration.clone(),
                        color: segment.period.gradient().to_string(),
                    })
                })
                .collect(),
        })
        .collect()
}
