//! Parser plugins and their registry. Each plugin recognizes one itinerary
//! convention; the orchestrator runs every capable plugin and keeps the
//! best-scoring valid result.

pub mod heuristic;
pub mod json;
pub mod markdown;
pub mod numbered;
pub mod plugin;
pub mod timerange;

pub use heuristic::HeuristicPlugin;
pub use json::JsonPlugin;
pub use markdown::MarkdownPeriodPlugin;
pub use numbered::NumberedListPlugin;
pub use plugin::{default_score, ParserPlugin, ParserRegistry};
pub use timerange::TimeRangePlugin;

use crate::heuristics;
use crate::types::Activity;

/// Build an activity from one line or sentence of itinerary prose. Returns
/// `None` for fragments too short to mean anything.
pub(crate) fn activity_from_text(text: &str) -> Option<Activity> {
    let cleaned = heuristics::clean_text(text);
    if cleaned.chars().count() < 4 {
        return None;
    }
    let cost = heuristics::extract_cost(&cleaned).unwrap_or_else(|| heuristics::estimate_cost(&cleaned));
    Some(Activity {
        title: heuristics::extract_activity_title(&cleaned),
        description: heuristics::truncate_chars(&cleaned, 200).to_string(),
        cost: Some(cost),
        duration: heuristics::extract_duration(&cleaned),
        tips: heuristics::extract_tips(&cleaned),
        location: None,
        icon: heuristics::activity_icon(&cleaned).to_string(),
    })
}
