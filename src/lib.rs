//! timeline-parser-rs: Convert LLM itinerary text into a structured, validated travel plan
//!
//! This library turns mixed Chinese/English natural-language itineraries into a
//! canonical day-by-day model. Parsing never fails outright: a plugin cascade
//! handles the recognized formats, a heuristic fallback absorbs free prose, and
//! an emergency synthesizer guarantees output for any input at all.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use timeline_parser_rs::{ParseContext, TimelineService};
//!
//! #[tokio::main]
//! async fn main() {
//!     let service = TimelineService::new();
//!     let context = ParseContext::new("北京", 2);
//!
//!     let result = service.parse("Day 1：**上午** 参观故宫博物院", &context).await;
//!     println!("{} day(s), parser: {:?}", result.day_count(), result.parser);
//! }
//! ```

pub mod cache;
pub mod error;
pub mod heuristics;
pub mod normalizer;
pub mod orchestrator;
pub mod plugins;
pub mod robust;
pub mod schema;
pub mod service;
pub(crate) mod splitter;
pub mod types;

pub use cache::{cache_key, TimelineCache};
pub use error::{ParseError, Result};
pub use normalizer::{convert_to_legacy, normalize_llm_output, normalize_plans};
pub use orchestrator::{Orchestrator, HEURISTIC_WARNING};
pub use plugins::{ParserPlugin, ParserRegistry};
pub use robust::{ParserStats, RobustTimelineParser, EMERGENCY_WARNING};
pub use schema::{validate_day_plans, ValidationReport};
pub use service::{TimelineService, CACHE_WARNING};
pub use types::{
    Activity, DayPlan, LegacyDayActivity, LegacyTimelineItem, ParseContext, ParseMetadata,
    ParseQuality, ParseResult, Period, Segment, Weather,
};

#[cfg(feature = "cli")]
pub mod cli;
